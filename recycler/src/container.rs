use alloc::string::ToString;
use alloc::vec::Vec;

use crate::pool::contract_violation;
use crate::{
    ContainerConfig, ContainerOptions, Edit, EditOutcome, ItemPool, ListStatus,
    OnWindowChangeCallback, PoolEntry, Reconciler, ScrollState, WidgetHost, WindowRange, Windower,
};

/// A virtualized, object-pooled list.
///
/// The container owns the backing collection ("available items"), a bounded [`ItemPool`] of live
/// widgets and the scroll state. It holds no UI objects itself: every widget is created, moved
/// and recycled through the [`WidgetHost`] it was built with.
///
/// Everything here runs on the host's single-threaded update path and never blocks:
/// - the host reports scrolling through [`ScrollContainer::scroll_to`] / [`ScrollContainer::scroll_by`],
/// - inbound data events go through `item_added` / `item_removed` / `items_replaced`,
/// - fetch results are committed through the `commit_*` methods,
/// - [`ScrollContainer::tick`] runs once per frame and brings the pool in line with the window.
///
/// For asynchronous refreshes, see the `recycler-fetch` crate.
pub struct ScrollContainer<T, W: WidgetHost<T>> {
    config: ContainerConfig,
    on_window_change: Option<OnWindowChangeCallback>,
    windower: Windower,
    items: Vec<T>,
    pool: ItemPool<T, W::Handle>,
    host: W,
    scroll: ScrollState,
    window: WindowRange,
    status: ListStatus,
}

impl<T, W> ScrollContainer<T, W>
where
    T: Clone + PartialEq,
    W: WidgetHost<T>,
{
    /// Creates a container from options and binds widgets for the initial window.
    pub fn new(options: ContainerOptions<T>, host: W) -> Self {
        let ContainerOptions {
            config,
            initial_items,
            on_window_change,
        } = options;
        if config.pool_capacity < config.max_displayed {
            rwarn!(
                pool_capacity = config.pool_capacity,
                max_displayed = config.max_displayed,
                "pool capacity below window size; raising it"
            );
        }
        let capacity = config.effective_pool_capacity();
        rdebug!(
            item_height = config.item_height,
            max_displayed = config.max_displayed,
            capacity,
            initial = initial_items.len(),
            "ScrollContainer::new"
        );

        let mut container = Self {
            windower: Windower::new(config.item_height, config.max_displayed),
            pool: ItemPool::new(capacity, config.item_height),
            config: ContainerConfig {
                pool_capacity: capacity,
                ..config
            },
            on_window_change,
            items: Vec::new(),
            host,
            scroll: ScrollState::default(),
            window: WindowRange::EMPTY,
            status: ListStatus::Ready,
        };
        container.reconciler().replace_all(initial_items);
        container.tick();
        container
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn windower(&self) -> &Windower {
        &self.windower
    }

    /// The full backing collection.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pool(&self) -> &ItemPool<T, W::Handle> {
        &self.pool
    }

    pub fn host(&self) -> &W {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut W {
        &mut self.host
    }

    pub fn into_host(mut self) -> W {
        self.pool.clear(&mut self.host);
        self.host
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset
    }

    /// Total scrollable height of the backing collection.
    pub fn content_extent(&self) -> f32 {
        self.windower.content_extent(self.items.len())
    }

    /// The window applied by the last [`ScrollContainer::tick`].
    pub fn window(&self) -> WindowRange {
        self.window
    }

    /// The window for the current scroll offset (may be ahead of the last tick).
    pub fn visible_range(&self) -> WindowRange {
        self.windower.window(self.scroll.offset, self.items.len())
    }

    /// Items inside [`ScrollContainer::visible_range`].
    pub fn visible_items(&self) -> &[T] {
        let range = self.visible_range();
        &self.items[range.start_index..range.end_index]
    }

    /// Finds the live entry bound to `item`, e.g. to restyle a selection.
    pub fn entry_for_item(&self, item: &T) -> Option<&PoolEntry<T, W::Handle>> {
        self.pool
            .find_by_identity(item)
            .and_then(|position| self.pool.get(position))
    }

    pub fn scroll_to(&mut self, offset: f32) {
        self.scroll.offset = offset;
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll.offset += delta;
    }

    /// Records where an external scroll animation is heading.
    pub fn set_target_offset(&mut self, target: f32) {
        self.scroll.target_offset = target;
    }

    /// Borrows the collection, pool, host and scroll state as a [`Reconciler`].
    pub fn reconciler(&mut self) -> Reconciler<'_, T, W::Handle, W> {
        Reconciler::new(
            &mut self.items,
            &mut self.pool,
            &mut self.host,
            &mut self.scroll,
        )
    }

    pub fn apply(&mut self, edit: Edit<T>) -> EditOutcome {
        self.reconciler().apply(edit)
    }

    pub fn item_added(&mut self, item: T) -> EditOutcome {
        self.reconciler().insert_at_bottom(item)
    }

    pub fn item_removed(&mut self, item: &T) -> EditOutcome {
        self.reconciler().remove_by_identity(item)
    }

    pub fn items_replaced(&mut self, items: Vec<T>) -> EditOutcome {
        self.status = ListStatus::Ready;
        self.reconciler().replace_all(items)
    }

    /// Commits a refresh result: full replace, then reports an empty result to the host.
    pub fn commit_replace(&mut self, items: Vec<T>) {
        let empty = items.is_empty();
        self.reconciler().replace_all(items);
        if empty {
            self.status = ListStatus::Empty;
            self.host.on_empty_result();
        } else {
            self.status = ListStatus::Ready;
        }
    }

    /// Commits a page of results by appending items not already present.
    pub fn commit_merge(&mut self, items: Vec<T>) {
        self.reconciler().merge(items);
        self.status = if self.items.is_empty() {
            ListStatus::Empty
        } else {
            ListStatus::Ready
        };
    }

    /// Commits a failed refresh: the list is cleared and marked unavailable.
    pub fn commit_failure(&mut self, reason: &str) {
        rdebug!(reason, "commit_failure");
        self.reconciler().replace_all(Vec::new());
        self.surface_error(reason);
    }

    /// Marks the list unavailable and notifies the host, keeping the current items.
    ///
    /// Used for failed pagination, where what is already shown is still valid.
    pub fn surface_error(&mut self, reason: &str) {
        self.status = ListStatus::Unavailable(reason.to_string());
        self.host.on_error(reason);
    }

    /// Brings the pool in line with the window for the current scroll offset.
    ///
    /// Entries outside the window are released (farthest first), missing indexes inside the
    /// window are bound, and the pool is reindexed if anything changed. Returns whether any
    /// widget was acquired or released.
    pub fn tick(&mut self) -> bool {
        let window = self.windower.window(self.scroll.offset, self.items.len());
        let mut changed = false;

        while let (Some(first), Some(last)) = (self.pool.first(), self.pool.last()) {
            let front = window.distance(first.index());
            let back = window.distance(last.index());
            if front == 0 && back == 0 {
                break;
            }
            if front >= back {
                self.pool.evict_front(&mut self.host);
            } else {
                self.pool.evict_back(&mut self.host);
            }
            changed = true;
        }

        if !window.is_empty() {
            if self.pool.is_empty() {
                changed |= self.bind(window.start_index);
            }
            while !self.pool.is_empty() && self.pool.range().end_index < window.end_index {
                if !self.bind(self.pool.range().end_index) {
                    break;
                }
                changed = true;
            }
            while !self.pool.is_empty() && self.pool.range().start_index > window.start_index {
                if !self.bind(self.pool.range().start_index - 1) {
                    break;
                }
                changed = true;
            }
        }

        if changed {
            self.pool.reindex(&mut self.host);
            rtrace!(
                start = window.start_index,
                end = window.end_index,
                pooled = self.pool.len(),
                "tick"
            );
        }
        self.scroll.previous_offset = self.scroll.offset;

        if window != self.window {
            self.window = window;
            if let Some(cb) = &self.on_window_change {
                cb(window, self.items.len());
            }
        }
        changed
    }

    fn bind(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index).cloned() else {
            return false;
        };
        match self.pool.acquire(&mut self.host, item, index) {
            Ok(_) => true,
            Err(err) => {
                contract_violation(err);
                false
            }
        }
    }
}

impl<T, W> core::fmt::Debug for ScrollContainer<T, W>
where
    W: WidgetHost<T>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollContainer")
            .field("config", &self.config)
            .field("items", &self.items.len())
            .field("pooled", &self.pool.range())
            .field("scroll", &self.scroll)
            .field("window", &self.window)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
