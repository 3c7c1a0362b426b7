//! Gesture state machine: pointer samples in, directional commits out.
//!
//! ```text
//! Idle ──start──▶ Dragging ──end (locked, past commit threshold)──▶ Committing ──finish──▶ Idle
//!                    │                                                   └──abort──▶ Idle
//!                    └──end (below threshold / no lock) or cancel──▶ Cancelling ──finish──▶ Idle
//! ```
//!
//! Transitions are pure functions of the current state and one sample, so the
//! machine runs without any display surface or animation clock. While a commit
//! is in flight new drags are ignored; a snap-back (Cancelling) can be
//! interrupted by a new drag.
//!
//! Coordinates are screen coordinates (y grows downward): dragging left
//! commits `Left`, dragging up commits `Up`.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::{Axis, Direction};

/// Minimum dominant-axis travel before a direction locks
pub const DEFAULT_DOMINANCE_THRESHOLD_PX: f64 = 20.0;

/// Minimum locked-axis travel on release to commit
pub const DEFAULT_COMMIT_THRESHOLD_PX: f64 = 100.0;

/// Distances (px) that drive locking and committing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThresholds {
    pub dominance_px: f64,
    pub commit_px: f64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            dominance_px: DEFAULT_DOMINANCE_THRESHOLD_PX,
            commit_px: DEFAULT_COMMIT_THRESHOLD_PX,
        }
    }
}

/// Pointer phase of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Start,
    Move,
    End,
    /// Pointer left the tracking surface mid-drag
    Cancel,
}

/// One raw pointer/touch sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    pub phase: PointerPhase,
}

impl PointerSample {
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            phase,
        }
    }

    pub fn start(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Start, x, y)
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    pub fn end(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::End, x, y)
    }

    /// Sample with a phase but no coordinates
    pub fn bare(phase: PointerPhase) -> Self {
        Self {
            x: None,
            y: None,
            phase,
        }
    }

    /// Coordinates, if both are present and finite
    pub fn point(&self) -> Option<(f64, f64)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        }
    }
}

/// Events produced on release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    DirectionCommitted(Direction),
    Cancelled,
}

/// Machine state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        origin: (f64, f64),
        offset: (f64, f64),
        lock: Option<Direction>,
    },
    /// Commit animation in flight; new drags are ignored
    Committing { direction: Direction },
    /// Snap-back animation in flight
    Cancelling,
}

/// Result of applying one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: GestureState,
    pub event: Option<GestureEvent>,
}

impl Transition {
    fn stay(state: GestureState) -> Self {
        Self { state, event: None }
    }
}

/// Direction lock for a cumulative offset, or None while ambiguous
pub fn direction_lock(dx: f64, dy: f64, dominance_px: f64) -> Option<Direction> {
    let (ax, ay) = (dx.abs(), dy.abs());

    if ax > ay && ax > dominance_px {
        Some(if dx < 0.0 { Direction::Left } else { Direction::Right })
    } else if ay > ax && ay > dominance_px {
        Some(if dy < 0.0 { Direction::Up } else { Direction::Down })
    } else {
        None
    }
}

fn release(offset: (f64, f64), thresholds: &GestureThresholds) -> Transition {
    let (dx, dy) = offset;

    match direction_lock(dx, dy, thresholds.dominance_px) {
        Some(direction) => {
            let travel = match direction.axis() {
                Axis::Horizontal => dx.abs(),
                Axis::Vertical => dy.abs(),
            };

            if travel > thresholds.commit_px {
                Transition {
                    state: GestureState::Committing { direction },
                    event: Some(GestureEvent::DirectionCommitted(direction)),
                }
            } else {
                cancelled()
            }
        }
        None => cancelled(),
    }
}

fn cancelled() -> Transition {
    Transition {
        state: GestureState::Cancelling,
        event: Some(GestureEvent::Cancelled),
    }
}

impl GestureState {
    /// Apply one sample
    pub fn apply(self, sample: &PointerSample, thresholds: &GestureThresholds) -> Transition {
        match (self, sample.phase) {
            (GestureState::Idle | GestureState::Cancelling, PointerPhase::Start) => {
                match sample.point() {
                    Some(origin) => Transition::stay(GestureState::Dragging {
                        origin,
                        offset: (0.0, 0.0),
                        lock: None,
                    }),
                    None => {
                        trace!("Dropping start sample without coordinates");
                        Transition::stay(self)
                    }
                }
            }

            (GestureState::Committing { .. }, PointerPhase::Start) => {
                debug!("Commit in flight, ignoring new drag");
                Transition::stay(self)
            }

            (GestureState::Dragging { origin, .. }, PointerPhase::Move) => match sample.point() {
                Some((x, y)) => {
                    let offset = (x - origin.0, y - origin.1);
                    Transition::stay(GestureState::Dragging {
                        origin,
                        offset,
                        lock: direction_lock(offset.0, offset.1, thresholds.dominance_px),
                    })
                }
                None => {
                    trace!("Dropping move sample without coordinates");
                    Transition::stay(self)
                }
            },

            (GestureState::Dragging { origin, offset, .. }, PointerPhase::End) => {
                let offset = sample
                    .point()
                    .map(|(x, y)| (x - origin.0, y - origin.1))
                    .unwrap_or(offset);
                release(offset, thresholds)
            }

            (GestureState::Dragging { .. }, PointerPhase::Cancel) => cancelled(),

            // Second pointer down mid-drag, stray moves/ends while idle or animating
            (state, _) => Transition::stay(state),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

/// Stateful wrapper over [`GestureState::apply`] for a single pointer stream
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    state: GestureState,
    thresholds: GestureThresholds,
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}

impl GestureStateMachine {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            state: GestureState::Idle,
            thresholds,
        }
    }

    /// Feed one sample, returning the release event if any
    pub fn handle(&mut self, sample: &PointerSample) -> Option<GestureEvent> {
        let transition = self.state.apply(sample, &self.thresholds);
        self.state = transition.state;
        transition.event
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Cumulative drag offset, zero outside a drag
    pub fn offset(&self) -> (f64, f64) {
        match self.state {
            GestureState::Dragging { offset, .. } => offset,
            _ => (0.0, 0.0),
        }
    }

    /// Current direction lock while dragging
    pub fn locked_direction(&self) -> Option<Direction> {
        match self.state {
            GestureState::Dragging { lock, .. } => lock,
            _ => None,
        }
    }

    /// True while a commit animation is in flight
    pub fn is_shuffling(&self) -> bool {
        matches!(self.state, GestureState::Committing { .. })
    }

    /// The commit or snap-back animation finished
    pub fn finish_transition(&mut self) {
        if matches!(
            self.state,
            GestureState::Committing { .. } | GestureState::Cancelling
        ) {
            self.state = GestureState::Idle;
        }
    }

    /// Drop a commit that had no neighbor to move to
    pub fn abort_commit(&mut self) {
        if self.is_shuffling() {
            self.state = GestureState::Idle;
        }
    }
}
