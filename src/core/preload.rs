//! Single-flight, timeout-bounded preload cache.
//!
//! Each key moves `Absent -> Pending -> Ready` and never leaves `Ready`.
//! Concurrent `warm` calls for the same key share one underlying load: the
//! check and the insert of the pending entry happen under one lock.
//!
//! `warm` never fails. A failed load is logged and the key is marked ready
//! anyway. A load that outlives the timeout is also marked ready; if it
//! finishes later nothing changes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::adapters::ResourceLoader;
use crate::domain::events::publish;
use crate::domain::{Event, EventKind, EventSink};

use super::timer::Timers;

/// Default bound on a single warm-up
pub const DEFAULT_PRELOAD_TIMEOUT: Duration = Duration::from_millis(3000);

/// Public view of a key's state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Pending,
    Ready,
}

enum Entry {
    /// Load in flight; the receiver flips to `true` when ready
    Pending(watch::Receiver<bool>),
    Ready,
}

/// What a caller should wait on after requesting a warm-up
enum Warm {
    Ready,
    Pending(watch::Receiver<bool>),
    ShutDown,
}

/// How a warm-up ended
enum Outcome {
    Loaded,
    Failed(String),
    TimedOut,
    Abandoned,
}

struct Inner {
    entries: Mutex<HashMap<String, Entry>>,
    loader: Arc<dyn ResourceLoader>,
    timeout: Duration,
    timers: Timers,
    events: Option<EventSink>,
}

impl Inner {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_ready(&self, key: &str) {
        let previous = self.entries().insert(key.to_string(), Entry::Ready);

        if !matches!(previous, Some(Entry::Ready)) {
            publish(
                self.events.as_ref(),
                Event::new(EventKind::PreloadReady {
                    key: key.to_string(),
                }),
            );
        }
    }
}

/// Preload cache shared by the feed and anything else that warms resources.
///
/// Cloning is cheap and clones share state. Warm-ups spawn tokio tasks, so
/// `warm` and `prefetch` must run inside a tokio runtime.
#[derive(Clone)]
pub struct PreloadCache {
    inner: Arc<Inner>,
}

impl PreloadCache {
    /// Create a cache that warms through `loader`
    pub fn new(loader: Arc<dyn ResourceLoader>, timeout: Duration) -> Self {
        Self::build(loader, timeout, None)
    }

    /// Create a cache that also publishes `PreloadReady` events
    pub fn with_events(loader: Arc<dyn ResourceLoader>, timeout: Duration, events: EventSink) -> Self {
        Self::build(loader, timeout, Some(events))
    }

    fn build(loader: Arc<dyn ResourceLoader>, timeout: Duration, events: Option<EventSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                loader,
                timeout,
                timers: Timers::new(),
                events,
            }),
        }
    }

    /// Warm `key` and wait until it is ready.
    ///
    /// Returns `true` once the key is ready (loaded, failed, or timed out) and
    /// `false` only if the cache was shut down first.
    #[instrument(level = "debug", skip(self))]
    pub async fn warm(&self, key: &str) -> bool {
        match self.begin(key) {
            Warm::Ready => true,
            Warm::ShutDown => false,
            Warm::Pending(mut ready) => ready.wait_for(|r| *r).await.is_ok(),
        }
    }

    /// Start warming `key` without waiting
    pub fn prefetch(&self, key: &str) {
        let _ = self.begin(key);
    }

    /// Whether `key` is ready; never blocks on a load
    pub fn is_ready(&self, key: &str) -> bool {
        matches!(self.inner.entries().get(key), Some(Entry::Ready))
    }

    /// State of `key`, or None if it was never warmed
    pub fn state(&self, key: &str) -> Option<CacheState> {
        self.inner.entries().get(key).map(|entry| match entry {
            Entry::Pending(_) => CacheState::Pending,
            Entry::Ready => CacheState::Ready,
        })
    }

    pub fn pending_count(&self) -> usize {
        self.inner
            .entries()
            .values()
            .filter(|e| matches!(e, Entry::Pending(_)))
            .count()
    }

    pub fn ready_count(&self) -> usize {
        self.inner
            .entries()
            .values()
            .filter(|e| matches!(e, Entry::Ready))
            .count()
    }

    /// Configured warm-up bound
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Cancel every outstanding timer and abandon pending warm-ups.
    ///
    /// Abandoned keys go back to absent and their waiters resolve `false`;
    /// later `warm` calls resolve `false` without starting a load. Ready keys
    /// stay ready.
    pub fn shutdown(&self) {
        debug!(pending = self.pending_count(), "Shutting down preload cache");
        self.inner.timers.cancel_all();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.timers.is_shut_down()
    }

    /// Atomically look up `key` and, if absent, register it as pending and
    /// start its load.
    fn begin(&self, key: &str) -> Warm {
        if self.inner.timers.is_shut_down() {
            return Warm::ShutDown;
        }

        let mut entries = self.inner.entries();
        match entries.get(key) {
            Some(Entry::Ready) => return Warm::Ready,
            Some(Entry::Pending(ready)) => return Warm::Pending(ready.clone()),
            None => {}
        }

        let (tx, rx) = watch::channel(false);
        entries.insert(key.to_string(), Entry::Pending(rx.clone()));
        drop(entries);

        self.spawn_load(key.to_string(), tx);
        Warm::Pending(rx)
    }

    fn spawn_load(&self, key: String, ready_tx: watch::Sender<bool>) {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let timer = inner.timers.schedule(inner.timeout);

            let loader = Arc::clone(&inner.loader);
            let load_key = key.clone();
            let mut load = tokio::spawn(async move { loader.load(&load_key).await });

            let outcome = tokio::select! {
                result = &mut load => match result {
                    Ok(Ok(())) => Outcome::Loaded,
                    Ok(Err(e)) => Outcome::Failed(format!("{:#}", e)),
                    Err(e) => Outcome::Failed(e.to_string()),
                },
                expired = timer.expired() => {
                    if expired { Outcome::TimedOut } else { Outcome::Abandoned }
                }
            };
            timer.cancel();

            match outcome {
                Outcome::Loaded => debug!(%key, "Preload complete"),
                Outcome::Failed(error) => {
                    warn!(%key, %error, "Preload failed, continuing with degraded playback")
                }
                Outcome::TimedOut => warn!(
                    %key,
                    timeout_ms = inner.timeout.as_millis() as u64,
                    "Preload timed out, marking ready"
                ),
                Outcome::Abandoned => {
                    load.abort();
                    inner.entries().remove(&key);
                    debug!(%key, "Preload abandoned on shutdown");
                    return;
                }
            }

            inner.mark_ready(&key);
            ready_tx.send_replace(true);
        });
    }
}

impl std::fmt::Debug for PreloadCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadCache")
            .field("loader", &self.inner.loader.name())
            .field("timeout", &self.inner.timeout)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::NoopLoader;

    #[tokio::test]
    async fn test_warm_marks_ready() {
        let cache = PreloadCache::new(Arc::new(NoopLoader), DEFAULT_PRELOAD_TIMEOUT);

        assert!(cache.state("a.mp4").is_none());
        assert!(!cache.is_ready("a.mp4"));

        assert!(cache.warm("a.mp4").await);
        assert!(cache.is_ready("a.mp4"));
        assert_eq!(cache.state("a.mp4"), Some(CacheState::Ready));
        assert_eq!(cache.ready_count(), 1);
        assert_eq!(cache.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_ready_event_published_once() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let cache = PreloadCache::with_events(Arc::new(NoopLoader), DEFAULT_PRELOAD_TIMEOUT, tx);

        assert!(cache.warm("a.mp4").await);
        assert!(cache.warm("a.mp4").await);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event.kind,
            EventKind::PreloadReady {
                key: "a.mp4".to_string()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_warm_after_shutdown_is_false() {
        let cache = PreloadCache::new(Arc::new(NoopLoader), DEFAULT_PRELOAD_TIMEOUT);
        cache.shutdown();

        assert!(cache.is_shut_down());
        assert!(!cache.warm("a.mp4").await);
        assert!(cache.state("a.mp4").is_none());
    }
}
