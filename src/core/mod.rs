//! Core feed logic.
//!
//! This module contains:
//! - resolver: Directional neighbor resolution over the catalog
//! - preload: Single-flight, timeout-bounded resource warming
//! - gesture: Pointer samples to directional commits
//! - window: Episode indicator projection
//! - timer: Cancellable timers backing preload timeouts
//! - feed: A session that ties the above together

pub mod feed;
pub mod gesture;
pub mod preload;
pub mod resolver;
pub mod timer;
pub mod window;

// Re-export commonly used types
pub use feed::{EpisodeWindow, FeedError, FeedSession, FeedSettings};
pub use gesture::{
    GestureEvent, GestureState, GestureStateMachine, GestureThresholds, PointerPhase, PointerSample,
};
pub use preload::{CacheState, PreloadCache, DEFAULT_PRELOAD_TIMEOUT};
pub use resolver::{NavigationResult, Neighbor};
pub use timer::{TimerHandle, Timers};
