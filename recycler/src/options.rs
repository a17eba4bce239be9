use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::WindowRange;

/// A callback fired after a tick changed the live window.
///
/// Arguments are the new window and the total item count.
pub type OnWindowChangeCallback = Arc<dyn Fn(WindowRange, usize) + Send + Sync>;

/// Plain-data geometry of a container.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`, so hosts can keep
/// list geometry in their settings files.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerConfig {
    /// Fixed height of one row, in pixels.
    pub item_height: f32,
    /// Window capacity: rows that can be visible at once.
    pub max_displayed: usize,
    /// Maximum number of simultaneously live widgets. Must be at least `max_displayed`.
    pub pool_capacity: usize,
}

impl ContainerConfig {
    pub fn new(item_height: f32, max_displayed: usize) -> Self {
        Self {
            item_height,
            max_displayed,
            pool_capacity: max_displayed,
        }
    }

    /// The pool capacity actually used: never below the window capacity.
    pub fn effective_pool_capacity(&self) -> usize {
        self.pool_capacity.max(self.max_displayed)
    }
}

/// Configuration for [`crate::ScrollContainer`].
///
/// Cheap to clone apart from `initial_items`: callbacks are stored in `Arc`s.
pub struct ContainerOptions<T> {
    pub config: ContainerConfig,
    /// Items the backing collection starts with.
    pub initial_items: Vec<T>,
    pub on_window_change: Option<OnWindowChangeCallback>,
}

impl<T: Clone> Clone for ContainerOptions<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            initial_items: self.initial_items.clone(),
            on_window_change: self.on_window_change.clone(),
        }
    }
}

impl<T> ContainerOptions<T> {
    /// Creates options for rows of `item_height` pixels with at most `max_displayed` rows on
    /// screen. The pool capacity defaults to `max_displayed`.
    pub fn new(item_height: f32, max_displayed: usize) -> Self {
        Self::from_config(ContainerConfig::new(item_height, max_displayed))
    }

    pub fn from_config(config: ContainerConfig) -> Self {
        Self {
            config,
            initial_items: Vec::new(),
            on_window_change: None,
        }
    }

    /// Sets the pool capacity, typically the window size plus a small buffer.
    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.config.pool_capacity = pool_capacity;
        self
    }

    pub fn with_initial_items(mut self, initial_items: impl IntoIterator<Item = T>) -> Self {
        self.initial_items = initial_items.into_iter().collect();
        self
    }

    pub fn with_on_window_change(
        mut self,
        on_window_change: Option<impl Fn(WindowRange, usize) + Send + Sync + 'static>,
    ) -> Self {
        self.on_window_change = on_window_change.map(|f| Arc::new(f) as _);
        self
    }
}

impl<T> core::fmt::Debug for ContainerOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("config", &self.config)
            .field("initial_items", &self.initial_items.len())
            .finish_non_exhaustive()
    }
}
