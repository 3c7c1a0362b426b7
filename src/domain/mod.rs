//! Domain types for feedgrid.
//!
//! This module contains the core data structures:
//! - Node: Content nodes and their identifiers
//! - Direction: Swipe directions, axes and neighbor reasons
//! - Events: Notifications for the presentation layer

pub mod direction;
pub mod events;
pub mod node;

// Re-export commonly used types
pub use direction::{Axis, Direction, NeighborReason};
pub use events::{Event, EventKind, EventSink};
pub use node::{ContentNode, NodeId};
