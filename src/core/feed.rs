//! Feed session: drives navigation from pointer input.
//!
//! A committed gesture is resolved to a neighbor, the neighbor and its own
//! neighbors are warmed, and the session moves onto it. The gesture machine
//! stays in its commit state until the presentation layer calls
//! [`FeedSession::finish_transition`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::events::publish;
use crate::domain::{ContentNode, Direction, Event, EventKind, EventSink};
use crate::library::Catalog;

use super::gesture::{GestureEvent, GestureStateMachine, GestureThresholds, PointerSample};
use super::preload::PreloadCache;
use super::resolver::{self, NavigationResult};
use super::window::{self, DEFAULT_MAX_VISIBLE};

/// Errors that can occur when opening a feed session
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Node not found in catalog: {0}")]
    UnknownNode(String),
}

/// Tunables for a feed session
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    pub thresholds: GestureThresholds,
    /// Neighbor hops to warm around the current node
    pub preload_depth: usize,
    /// Episode indicators shown at once
    pub max_visible: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            thresholds: GestureThresholds::default(),
            preload_depth: 1,
            max_visible: DEFAULT_MAX_VISIBLE,
        }
    }
}

/// Condensed episode indicator for the current node
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeWindow<'a> {
    /// Visible episodes in series order
    pub episodes: Vec<&'a ContentNode>,
    /// Series index of the first visible episode
    pub start: usize,
    /// Series index of the current node
    pub current: usize,
    /// Episodes in the whole series
    pub total: usize,
}

/// One user's walk through the feed.
///
/// Moving to a neighbor starts preloads on the tokio runtime, so sample
/// handling must run inside one.
pub struct FeedSession {
    id: Uuid,
    catalog: Arc<Catalog>,
    cache: PreloadCache,
    gesture: GestureStateMachine,
    settings: FeedSettings,

    /// Catalog position of the displayed node
    current: usize,

    events: Option<EventSink>,
}

impl FeedSession {
    /// Open a session on `start_id`
    pub fn new(
        catalog: Arc<Catalog>,
        cache: PreloadCache,
        settings: FeedSettings,
        start_id: &str,
    ) -> Result<Self, FeedError> {
        let current = catalog
            .position(start_id)
            .ok_or_else(|| FeedError::UnknownNode(start_id.to_string()))?;

        Ok(Self {
            id: Uuid::new_v4(),
            catalog,
            cache,
            gesture: GestureStateMachine::new(settings.thresholds),
            settings,
            current,
            events: None,
        })
    }

    /// Publish session events to `sink`
    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The displayed node
    pub fn current(&self) -> &ContentNode {
        &self.catalog.nodes()[self.current]
    }

    pub fn gesture(&self) -> &GestureStateMachine {
        &self.gesture
    }

    pub fn cache(&self) -> &PreloadCache {
        &self.cache
    }

    /// Whether the displayed node's resource is warm
    pub fn is_current_ready(&self) -> bool {
        self.cache.is_ready(&self.current().resource_url)
    }

    /// Resolve the current node's neighbors, announcing each direction
    pub fn neighbors(&self) -> NavigationResult<'_> {
        let result = resolver::resolve(&self.catalog, self.current().id.as_str());

        for (direction, found) in result.iter() {
            self.emit(EventKind::NeighborResolved {
                direction,
                node_id: found.map(|n| n.node.id.clone()),
                reason: found.map(|n| n.reason),
            });
        }

        result
    }

    /// Start warming the current node and its neighbors
    pub fn warm_around(&self) {
        let current = self.current();
        self.cache.prefetch(&current.resource_url);

        let targets = resolver::preload_targets(&self.catalog, current.id.as_str(), self.settings.preload_depth);
        debug!(node = %current.id, targets = targets.len(), "Warming neighborhood");

        for node in targets {
            self.cache.prefetch(&node.resource_url);
        }
    }

    /// Feed one pointer sample; returns the release event, if any
    pub fn handle_sample(&mut self, sample: &PointerSample) -> Option<GestureEvent> {
        let event = self.gesture.handle(sample)?;

        match event {
            GestureEvent::Cancelled => self.emit(EventKind::Cancelled),
            GestureEvent::DirectionCommitted(direction) => {
                self.emit(EventKind::DirectionCommitted { direction });
                self.commit(direction);
            }
        }

        Some(event)
    }

    /// The commit or snap-back animation finished
    pub fn finish_transition(&mut self) {
        self.gesture.finish_transition();
    }

    /// True while a commit animation is in flight
    pub fn is_shuffling(&self) -> bool {
        self.gesture.is_shuffling()
    }

    /// Episode indicator window for the current node, if it is in a series
    pub fn episode_window(&self) -> Option<EpisodeWindow<'_>> {
        let current = self.current();
        let series = self.catalog.series(current.series_id.as_deref()?);
        let index = series.iter().position(|n| n.id == current.id)?;

        let bounds = window::window_bounds(series.len(), index, self.settings.max_visible);
        Some(EpisodeWindow {
            start: bounds.start,
            current: index,
            total: series.len(),
            episodes: series[bounds].to_vec(),
        })
    }

    /// Abandon the session and take its preload cache down with it.
    ///
    /// The cache is shared: every clone, and every other session built on
    /// it, stops warming too. Applications that outlive one session should
    /// call [`PreloadCache::shutdown`] themselves and just drop the session.
    pub fn shutdown(&self) {
        debug!(session = %self.id, "Feed session shutting down");
        self.cache.shutdown();
    }

    fn commit(&mut self, direction: Direction) {
        let from = self.current().id.clone();
        let target = resolver::neighbor(&self.catalog, from.as_str(), direction)
            .map(|n| (n.node.id.clone(), n.reason));

        self.emit(EventKind::NeighborResolved {
            direction,
            node_id: target.as_ref().map(|(id, _)| id.clone()),
            reason: target.as_ref().map(|(_, reason)| *reason),
        });

        let Some(position) = target.and_then(|(id, _)| self.catalog.position(id.as_str())) else {
            debug!(node = %from, %direction, "No neighbor, dropping commit");
            self.gesture.abort_commit();
            return;
        };

        self.current = position;
        info!(from = %from, to = %self.current().id, %direction, "Moved to neighbor");
        self.warm_around();
    }

    fn emit(&self, kind: EventKind) {
        publish(self.events.as_ref(), Event::new(kind).with_session(self.id));
    }
}

impl std::fmt::Debug for FeedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSession")
            .field("id", &self.id)
            .field("current", &self.current().id)
            .field("gesture", &self.gesture.state())
            .finish()
    }
}
