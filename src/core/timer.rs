//! Cancellable timers.
//!
//! Every timer is a child of one root token, so tearing down a session
//! cancels every outstanding timer at once. Dropping a handle cancels it.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Issues timers that can be cancelled individually or all together
#[derive(Debug, Clone, Default)]
pub struct Timers {
    root: CancellationToken,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer that expires after `delay`
    pub fn schedule(&self, delay: Duration) -> TimerHandle {
        TimerHandle {
            deadline: Instant::now() + delay,
            token: self.root.child_token(),
        }
    }

    /// Cancel every timer issued so far, and every timer issued later
    pub fn cancel_all(&self) {
        self.root.cancel();
    }

    /// Whether `cancel_all` has been called
    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Resolves once `cancel_all` is called
    pub async fn shut_down(&self) {
        self.root.cancelled().await;
    }
}

/// A single pending timer
#[derive(Debug)]
pub struct TimerHandle {
    deadline: Instant,
    token: CancellationToken,
}

impl TimerHandle {
    /// Wait for the timer: `true` if it expired, `false` if it was cancelled
    pub async fn expired(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep_until(self.deadline) => true,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
