//! Episode indicator window.
//!
//! Long series are shown as a condensed strip of at most `max_visible`
//! episodes centered on the current one, sliding against either end.

use std::ops::Range;

/// Default number of visible episode indicators
pub const DEFAULT_MAX_VISIBLE: usize = 7;

/// Index range of the visible window over `len` episodes.
///
/// The range always contains `current` (clamped to the last index) and has
/// length `min(max_visible, len)`. For an even `max_visible` the extra slot
/// goes before `current`.
pub fn window_bounds(len: usize, current: usize, max_visible: usize) -> Range<usize> {
    if len == 0 {
        return 0..0;
    }

    let max_visible = max_visible.max(1);
    if len <= max_visible {
        return 0..len;
    }

    let current = current.min(len - 1);
    let half = max_visible / 2;
    let start = current.saturating_sub(half).min(len - max_visible);

    start..start + max_visible
}

/// Visible slice of `episodes` around `current`
pub fn project<T>(episodes: &[T], current: usize, max_visible: usize) -> &[T] {
    &episodes[window_bounds(episodes.len(), current, max_visible)]
}
