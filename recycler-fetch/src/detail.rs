use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::{FetchCoordinator, FetchError, Settled};

/// How often visible items get their details refreshed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollOptions {
    pub interval_ms: u64,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

impl PollOptions {
    pub fn new(interval_ms: u64) -> Self {
        Self { interval_ms }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Periodically fetches per-item details for the visible window only.
///
/// Each due poll sends every visible item in one batched request. Polls go through their own
/// [`FetchCoordinator`], so a slow poll is superseded by the next one instead of piling up.
///
/// The update path publishes the visible set on every [`DetailPoller::tick`]. Workers drop
/// details for items that scrolled out while the request was running, checking under the same
/// lock the update path writes through.
pub struct DetailPoller<T, D> {
    options: PollOptions,
    coordinator: FetchCoordinator<Vec<T>, Vec<(T, D)>>,
    visible: Arc<Mutex<Vec<T>>>,
    last_poll_ms: Option<u64>,
}

impl<T, D> DetailPoller<T, D>
where
    T: Clone + PartialEq + Send + 'static,
    D: Send + 'static,
{
    pub fn new<F, Fut>(runtime: Handle, options: PollOptions, fetch: F) -> Self
    where
        F: Fn(Vec<T>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<(T, D)>, FetchError>> + Send + 'static,
    {
        let visible = Arc::new(Mutex::new(Vec::new()));
        let snapshot = Arc::clone(&visible);
        let coordinator = FetchCoordinator::new(runtime, move |items, cancel| {
            let snapshot = Arc::clone(&snapshot);
            let details = fetch(items, cancel);
            async move {
                details
                    .await
                    .map(|details| retain_visible(&snapshot.lock(), details))
            }
        });
        Self {
            options,
            coordinator,
            visible,
            last_poll_ms: None,
        }
    }

    pub fn options(&self) -> PollOptions {
        self.options
    }

    /// `true` while a poll is in flight.
    pub fn is_polling(&self) -> bool {
        self.coordinator.is_fetching()
    }

    pub fn coordinator(&self) -> &FetchCoordinator<Vec<T>, Vec<(T, D)>> {
        &self.coordinator
    }

    /// Whether a poll would be started at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.last_poll_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.options.interval_ms)
    }

    /// Publishes `visible`, returns details committed since the last tick, and starts a new
    /// poll if one is due.
    ///
    /// Returned details only cover items that are still in `visible`.
    pub fn tick(&mut self, now_ms: u64, visible: &[T]) -> Option<Vec<(T, D)>> {
        {
            let mut snapshot = self.visible.lock();
            if snapshot.as_slice() != visible {
                snapshot.clear();
                snapshot.extend_from_slice(visible);
            }
        }

        let committed = match self.coordinator.drain() {
            Some(Settled::Committed { value, .. }) => Some(retain_visible(visible, value)),
            // Details are best effort; a failed or abandoned poll leaves the list untouched.
            Some(Settled::Failed { .. } | Settled::Cancelled { .. }) | None => None,
        };

        if !visible.is_empty() && self.is_due(now_ms) {
            self.last_poll_ms = Some(now_ms);
            ftrace!(count = visible.len(), "detail poll");
            self.coordinator.request_refresh(visible.to_vec());
        }

        committed
    }

    /// Forgets the last poll time so the next tick polls immediately.
    pub fn poll_now(&mut self) {
        self.last_poll_ms = None;
    }

    pub fn cancel(&mut self) {
        self.coordinator.cancel();
    }
}

fn retain_visible<T: PartialEq, D>(visible: &[T], details: Vec<(T, D)>) -> Vec<(T, D)> {
    details
        .into_iter()
        .filter(|(item, _)| visible.contains(item))
        .collect()
}

impl<T, D> std::fmt::Debug for DetailPoller<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailPoller")
            .field("options", &self.options)
            .field("last_poll_ms", &self.last_poll_ms)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
