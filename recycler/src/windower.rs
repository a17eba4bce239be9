use crate::WindowRange;

/// Maps a scroll offset to the index range that must currently have a live widget.
///
/// Items have a fixed height, so the mapping is closed-form:
///
/// - `start = clamp(round(|offset| / item_height), 0, max(count - 1, 0))`
/// - `end = min(start + max_displayed, count)`
///
/// The windower holds no state besides its geometry and is cheap to call every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Windower {
    item_height: f32,
    max_displayed: usize,
}

impl Windower {
    pub fn new(item_height: f32, max_displayed: usize) -> Self {
        Self {
            item_height,
            max_displayed,
        }
    }

    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    pub fn max_displayed(&self) -> usize {
        self.max_displayed
    }

    pub fn window(&self, scroll_offset: f32, total_count: usize) -> WindowRange {
        visible_window(scroll_offset, self.item_height, self.max_displayed, total_count)
    }

    /// Layout offset of the widget bound to `index`.
    pub fn offset_of(&self, index: usize) -> f32 {
        index as f32 * self.item_height
    }

    /// Total scrollable height for `total_count` items.
    pub fn content_extent(&self, total_count: usize) -> f32 {
        total_count as f32 * self.item_height
    }
}

/// Computes the visible window for a fixed-height list.
///
/// A non-finite `scroll_offset` is treated as zero. A non-positive (or non-finite) `item_height`
/// cannot be windowed and yields an empty range.
pub fn visible_window(
    scroll_offset: f32,
    item_height: f32,
    max_displayed: usize,
    total_count: usize,
) -> WindowRange {
    if total_count == 0 || max_displayed == 0 {
        return WindowRange::EMPTY;
    }
    if !(item_height.is_finite() && item_height > 0.0) {
        rwarn!(item_height, "visible_window: invalid item height");
        return WindowRange::EMPTY;
    }

    let magnitude = if scroll_offset.is_finite() {
        if scroll_offset < 0.0 {
            -scroll_offset
        } else {
            scroll_offset
        }
    } else {
        0.0
    };

    // Round half away from zero by comparing against the truncated value; adding 0.5 first
    // would carry just-below-half fractions up. Float → int casts saturate.
    let rows = {
        let exact = magnitude / item_height;
        let whole = exact as usize;
        if exact - whole as f32 >= 0.5 {
            whole.saturating_add(1)
        } else {
            whole
        }
    };
    let start = rows.min(total_count - 1);
    let end = start.saturating_add(max_displayed).min(total_count);

    WindowRange {
        start_index: start,
        end_index: end,
    }
}
