//! Output events consumed by the presentation layer.
//!
//! Events are fire-and-forget notifications; nothing in the core replays or
//! persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::direction::{Direction, NeighborReason};
use super::node::NodeId;

/// Sender half used by the cache and feed sessions to publish events
pub type EventSink = mpsc::UnboundedSender<Event>;

/// A single feed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event
    pub id: Uuid,

    /// When this event occurred
    pub timestamp: DateTime<Utc>,

    /// Feed session that produced the event (None for cache-level events)
    pub session_id: Option<Uuid>,

    /// What happened
    pub kind: EventKind,
}

impl Event {
    /// Create a new event with the current timestamp
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            session_id: None,
            kind,
        }
    }

    /// Attach the producing session
    pub fn with_session(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A direction was resolved to a neighbor (or to nothing)
    NeighborResolved {
        direction: Direction,
        node_id: Option<NodeId>,
        reason: Option<NeighborReason>,
    },

    /// A drag was released past the commit threshold
    DirectionCommitted { direction: Direction },

    /// A drag ended without a commit
    Cancelled,

    /// A resource finished warming (or was forced ready)
    PreloadReady { key: String },
}

/// Publish an event, ignoring a closed sink
pub(crate) fn publish(sink: Option<&EventSink>, event: Event) {
    if let Some(tx) = sink {
        if tx.send(event).is_err() {
            tracing::trace!("Event sink closed, dropping event");
        }
    }
}
