/// A half-open range of logical indexes `[start_index, end_index)` that must currently be backed by
/// a live widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl WindowRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index: end_index.max(start_index),
        }
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }

    /// Distance from `index` to the nearest index inside the range (0 when inside).
    pub fn distance(&self, index: usize) -> usize {
        if index < self.start_index {
            self.start_index - index
        } else if index >= self.end_index {
            index + 1 - self.end_index
        } else {
            0
        }
    }
}

/// Whether a structural edit changed anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The edit referenced an absent item (remove) or a duplicate (insert).
    NoOp,
}

impl EditOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A structural edit to the backing collection, applied in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit<T> {
    /// Append at the bottom (e.g. a user connected).
    Added(T),
    /// Remove by identity (e.g. a user disconnected, a mapset was downloaded).
    Removed(T),
    /// Replace the whole collection (query changed, reconnect, logout).
    Replaced(alloc::vec::Vec<T>),
    /// Append every item that is not already present (next page of results).
    Merged(alloc::vec::Vec<T>),
}

/// What the host screen should show next to the list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ListStatus {
    #[default]
    Ready,
    /// The last committed result had no items.
    Empty,
    /// The last fetch failed. A failed refresh also clears the list.
    Unavailable(alloc::string::String),
}
