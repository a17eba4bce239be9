use alloc::vec::Vec;

use crate::pool::contract_violation;
use crate::{Edit, EditOutcome, ItemPool, ScrollState, WidgetHost};

/// Applies structural edits of the backing collection to an [`ItemPool`] with minimal churn.
///
/// A reconciler borrows the parts of a container it needs for the duration of one edit.
/// [`crate::ScrollContainer`] builds one per inbound event, but a host that keeps its own
/// collection and pool can use it directly.
///
/// Identity is equality: an item "is present" when an equal item is in the collection.
pub struct Reconciler<'a, T, H, W: ?Sized> {
    items: &'a mut Vec<T>,
    pool: &'a mut ItemPool<T, H>,
    host: &'a mut W,
    scroll: &'a mut ScrollState,
}

impl<'a, T, H, W> Reconciler<'a, T, H, W>
where
    T: Clone + PartialEq,
    W: WidgetHost<T, Handle = H> + ?Sized,
{
    pub fn new(
        items: &'a mut Vec<T>,
        pool: &'a mut ItemPool<T, H>,
        host: &'a mut W,
        scroll: &'a mut ScrollState,
    ) -> Self {
        Self {
            items,
            pool,
            host,
            scroll,
        }
    }

    pub fn apply(&mut self, edit: Edit<T>) -> EditOutcome {
        match edit {
            Edit::Added(item) => self.insert_at_bottom(item),
            Edit::Removed(item) => self.remove_by_identity(&item),
            Edit::Replaced(items) => self.replace_all(items),
            Edit::Merged(items) => self.merge(items),
        }
    }

    /// Appends `item`. When the pool reaches the end of the collection and has spare capacity, a
    /// widget is bound right away; otherwise the item waits for the window to advance.
    ///
    /// Inserting an item that is already present is a no-op.
    pub fn insert_at_bottom(&mut self, item: T) -> EditOutcome {
        if self.items.contains(&item) {
            rtrace!("insert_at_bottom: duplicate ignored");
            return EditOutcome::NoOp;
        }
        self.append(item);
        self.publish_extent();
        EditOutcome::Applied
    }

    /// Removes `item`, dropping its widget if it has one and closing the gap in the pool.
    ///
    /// Removing an item that is not present is a no-op.
    pub fn remove_by_identity(&mut self, item: &T) -> EditOutcome {
        let Some(logical) = self.items.iter().position(|it| it == item) else {
            rtrace!("remove_by_identity: absent item ignored");
            return EditOutcome::NoOp;
        };
        self.items.remove(logical);

        let range = self.pool.range();
        if !self.pool.is_empty() {
            if logical < range.start_index {
                // Everything pooled moves up one row.
                self.pool.set_starting_index(range.start_index - 1);
            } else if range.contains(logical) {
                self.pool.remove_at(&mut *self.host, logical - range.start_index);
            }
            self.pool.reindex(&mut *self.host);
        }

        rdebug!(
            logical,
            remaining = self.items.len(),
            pooled = self.pool.len(),
            "remove_by_identity"
        );
        self.publish_extent();
        EditOutcome::Applied
    }

    /// Tears the pool down, swaps the collection, resets scrolling to the origin and rebuilds the
    /// pool from index 0 up to its capacity.
    pub fn replace_all(&mut self, items: Vec<T>) -> EditOutcome {
        self.pool.clear(&mut *self.host);
        *self.items = items;
        self.scroll.reset();

        let fill = self.items.len().min(self.pool.capacity());
        for index in 0..fill {
            let item = self.items[index].clone();
            if let Err(err) = self.pool.acquire(&mut *self.host, item, index) {
                contract_violation(err);
                break;
            }
        }

        rdebug!(
            count = self.items.len(),
            pooled = self.pool.len(),
            "replace_all"
        );
        self.publish_extent();
        EditOutcome::Applied
    }

    /// Appends every item that is not already present, in order. Scroll position is kept.
    pub fn merge(&mut self, items: Vec<T>) -> EditOutcome {
        let mut appended = 0usize;
        for item in items {
            if self.items.contains(&item) {
                continue;
            }
            self.append(item);
            appended += 1;
        }
        if appended == 0 {
            return EditOutcome::NoOp;
        }
        rdebug!(appended, count = self.items.len(), "merge");
        self.publish_extent();
        EditOutcome::Applied
    }

    fn append(&mut self, item: T) {
        let index = self.items.len();
        let reaches_end = if self.pool.is_empty() {
            index == 0
        } else {
            self.pool.range().end_index == index
        };
        let bind = reaches_end && !self.pool.is_full();

        self.items.push(item);
        if bind {
            let item = self.items[index].clone();
            if let Err(err) = self.pool.acquire(&mut *self.host, item, index) {
                contract_violation(err);
            }
        }
    }

    fn publish_extent(&mut self) {
        let extent = self.items.len() as f32 * self.pool.item_height();
        self.host.set_content_extent(extent);
    }
}
