//! feedgrid - Navigation core for a short-form video feed
//!
//! Content is laid out on a two-dimensional grid: vertical swipes move
//! through a series' episodes, horizontal swipes rotate through alternate
//! versions of the current clip (or, failing that, tag-related clips).
//!
//! # Architecture
//!
//! Pointer samples drive a gesture state machine. A committed direction is
//! resolved against the catalog, the target and its own neighbors are warmed
//! through a single-flight preload cache, and the session moves on:
//! - Neighbors are a pure function of the catalog and the current node
//! - Every resource is loaded at most once, bounded by a timeout
//! - A preload never blocks navigation; failures degrade to a cold start
//!
//! # Modules
//!
//! - `adapters`: Resource loaders (HTTP, local files)
//! - `core`: Resolver, preload cache, gesture machine, episode window, session
//! - `domain`: Data structures (ContentNode, Direction, Event)
//! - `library`: The read-only content catalog
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Show the neighbors of a clip
//! feedgrid neighbors ep-2
//!
//! # Replay recorded pointer samples
//! feedgrid gesture --start ep-1 samples.jsonl
//!
//! # Warm a clip and its neighborhood
//! feedgrid preload ep-2 --depth 2
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use adapters::{NoopLoader, ResourceLoader, SchemeLoader};
pub use core::{FeedError, FeedSession, FeedSettings, GestureStateMachine, PreloadCache};
pub use domain::{ContentNode, Direction, Event, EventKind, NeighborReason, NodeId};
pub use library::{Catalog, CatalogError};
