use alloc::collections::VecDeque;

use crate::{WidgetHost, WindowRange};

/// Errors returned by [`ItemPool::acquire`].
///
/// Both variants mean the caller violated the pool's contract (the window must never exceed the
/// pool capacity, and entries must stay contiguous). [`crate::ScrollContainer`] never triggers
/// them; it debug-asserts if it does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("pool capacity exceeded (capacity={capacity})")]
    CapacityExceeded { capacity: usize },
    #[error("index {index} is not adjacent to the pooled range {start}..{end}")]
    NotContiguous {
        index: usize,
        start: usize,
        end: usize,
    },
}

/// Reports a broken pool contract: loud in debug builds, a warning in release builds.
pub(crate) fn contract_violation(err: PoolError) {
    rwarn!(%err, "pool contract violated");
    debug_assert!(false, "pool contract violated: {err}");
}

/// A live widget bound to one logical item.
#[derive(Debug)]
pub struct PoolEntry<T, H> {
    handle: Option<H>,
    item: T,
    index: usize,
}

impl<T, H> PoolEntry<T, H> {
    /// The widget handle, or `None` once the entry has been released.
    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }
}

/// A bounded, position-addressed set of recyclable widget slots.
///
/// Entries are kept in logical order. The entry at position `p` always reports
/// `index == starting_index + p` after [`ItemPool::reindex`]; acquisition only ever extends the
/// pooled range at either end, so the range never has gaps.
#[derive(Debug)]
pub struct ItemPool<T, H> {
    entries: VecDeque<PoolEntry<T, H>>,
    starting_index: usize,
    capacity: usize,
    item_height: f32,
}

impl<T, H> ItemPool<T, H> {
    pub fn new(capacity: usize, item_height: f32) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            starting_index: 0,
            capacity,
            item_height,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Logical index of the entry at position 0.
    pub fn starting_index(&self) -> usize {
        self.starting_index
    }

    /// The logical index range covered by the pool.
    pub fn range(&self) -> WindowRange {
        WindowRange::new(
            self.starting_index,
            self.starting_index + self.entries.len(),
        )
    }

    pub fn get(&self, position: usize) -> Option<&PoolEntry<T, H>> {
        self.entries.get(position)
    }

    pub fn first(&self) -> Option<&PoolEntry<T, H>> {
        self.entries.front()
    }

    pub fn last(&self) -> Option<&PoolEntry<T, H>> {
        self.entries.back()
    }

    /// Looks up the entry bound to a logical index.
    pub fn entry_for_index(&self, index: usize) -> Option<&PoolEntry<T, H>> {
        let position = index.checked_sub(self.starting_index)?;
        self.entries.get(position)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &PoolEntry<T, H>> + '_ {
        self.entries.iter()
    }

    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    /// Target layout offset for a logical index.
    pub fn offset_of(&self, index: usize) -> f32 {
        index as f32 * self.item_height
    }

    /// `true` when every entry's index equals `starting_index + position`.
    pub fn is_contiguous(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(position, entry)| entry.index == self.starting_index + position)
    }

    /// Binds a new widget to `item` at logical `index`.
    ///
    /// `index` must extend the pooled range: any index when the pool is empty, otherwise
    /// `starting_index - 1` or `starting_index + len`. Returns the entry's position.
    pub fn acquire<W>(&mut self, host: &mut W, item: T, index: usize) -> Result<usize, PoolError>
    where
        W: WidgetHost<T, Handle = H> + ?Sized,
    {
        if self.entries.len() >= self.capacity {
            return Err(PoolError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let end = self.starting_index + self.entries.len();
        let at_front = if self.entries.is_empty() {
            self.starting_index = index;
            false
        } else if index == end {
            false
        } else if index.checked_add(1) == Some(self.starting_index) {
            true
        } else {
            return Err(PoolError::NotContiguous {
                index,
                start: self.starting_index,
                end,
            });
        };

        let handle = host.acquire_widget(&item, index);
        host.set_widget_offset(&handle, index, self.offset_of(index));
        rtrace!(index, at_front, "ItemPool::acquire");

        let entry = PoolEntry {
            handle: Some(handle),
            item,
            index,
        };
        if at_front {
            self.entries.push_front(entry);
            self.starting_index = index;
            Ok(0)
        } else {
            self.entries.push_back(entry);
            Ok(self.entries.len() - 1)
        }
    }

    /// Detaches the widget at `position` and hands it back to the host.
    ///
    /// The entry stays in the pool in its released state until removed. Releasing an entry twice
    /// (or an out-of-range position) is a no-op; returns whether a widget was released.
    pub fn release<W>(&mut self, host: &mut W, position: usize) -> bool
    where
        W: WidgetHost<T, Handle = H> + ?Sized,
    {
        let Some(entry) = self.entries.get_mut(position) else {
            return false;
        };
        let Some(handle) = entry.handle.take() else {
            return false;
        };
        rtrace!(index = entry.index, "ItemPool::release");
        host.release_widget(handle);
        true
    }

    /// Releases and removes the first entry; the remaining entries keep their indexes.
    pub fn evict_front<W>(&mut self, host: &mut W) -> Option<T>
    where
        W: WidgetHost<T, Handle = H> + ?Sized,
    {
        if self.entries.is_empty() {
            return None;
        }
        self.release(host, 0);
        let entry = self.entries.pop_front()?;
        if !self.entries.is_empty() {
            self.starting_index += 1;
        }
        Some(entry.item)
    }

    /// Releases and removes the last entry.
    pub fn evict_back<W>(&mut self, host: &mut W) -> Option<T>
    where
        W: WidgetHost<T, Handle = H> + ?Sized,
    {
        let last = self.entries.len().checked_sub(1)?;
        self.release(host, last);
        self.entries.pop_back().map(|entry| entry.item)
    }

    /// Releases and removes the entry at `position` without touching the starting index.
    ///
    /// Entries after `position` keep their stale indexes until [`ItemPool::reindex`] runs.
    pub fn remove_at<W>(&mut self, host: &mut W, position: usize) -> Option<T>
    where
        W: WidgetHost<T, Handle = H> + ?Sized,
    {
        self.release(host, position);
        self.entries.remove(position).map(|entry| entry.item)
    }

    /// Moves the whole pooled range so that position 0 maps to `starting_index`.
    ///
    /// Call [`ItemPool::reindex`] afterwards to push the new offsets to the host.
    pub fn set_starting_index(&mut self, starting_index: usize) {
        self.starting_index = starting_index;
    }

    /// Reassigns `index = starting_index + position` and repositions every widget whose index
    /// changed. Returns how many entries moved.
    pub fn reindex<W>(&mut self, host: &mut W) -> usize
    where
        W: WidgetHost<T, Handle = H> + ?Sized,
    {
        let mut moved = 0usize;
        for (position, entry) in self.entries.iter_mut().enumerate() {
            let index = self.starting_index + position;
            if entry.index == index {
                continue;
            }
            entry.index = index;
            if let Some(handle) = &entry.handle {
                host.set_widget_offset(handle, index, index as f32 * self.item_height);
            }
            moved += 1;
        }
        if moved > 0 {
            rtrace!(moved, start = self.starting_index, "ItemPool::reindex");
        }
        moved
    }

    /// Releases every entry and empties the pool.
    pub fn clear<W>(&mut self, host: &mut W)
    where
        W: WidgetHost<T, Handle = H> + ?Sized,
    {
        for position in 0..self.entries.len() {
            self.release(host, position);
        }
        self.entries.clear();
        self.starting_index = 0;
    }
}

impl<T: PartialEq, H> ItemPool<T, H> {
    /// Linear scan for the entry bound to `item`. The pool is small and bounded, so this does
    /// not scale with the backing collection.
    pub fn find_by_identity(&self, item: &T) -> Option<usize> {
        self.entries.iter().position(|entry| entry.item == *item)
    }
}
