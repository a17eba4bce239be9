use std::future::Future;

use recycler::{ContainerOptions, Edit, EditOutcome, ScrollContainer, WidgetHost};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    CommitMode, DetailPoller, FetchCoordinator, FetchError, FetchToken, PollOptions, Settled,
};

/// Delivers data events to a [`BoundList`] from any thread.
///
/// Events are applied in arrival order on the list's next [`BoundList::tick`]. Every method
/// returns `false` once the list has been dropped.
pub struct EventSender<T> {
    tx: mpsc::UnboundedSender<Edit<T>>,
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventSender<T> {
    pub fn send(&self, edit: Edit<T>) -> bool {
        self.tx.send(edit).is_ok()
    }

    pub fn item_added(&self, item: T) -> bool {
        self.send(Edit::Added(item))
    }

    pub fn item_removed(&self, item: T) -> bool {
        self.send(Edit::Removed(item))
    }

    pub fn items_replaced(&self, items: Vec<T>) -> bool {
        self.send(Edit::Replaced(items))
    }
}

impl<T> std::fmt::Debug for EventSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

type OnDetails<W, T, D> = Box<dyn FnMut(&mut W, Vec<(T, D)>) + Send>;

struct DetailBinding<W, T, D> {
    poller: DetailPoller<T, D>,
    on_details: OnDetails<W, T, D>,
}

/// A [`ScrollContainer`] wired to its data sources.
///
/// Owns the container, a list [`FetchCoordinator`] (`P` is the request parameters, e.g. a search
/// query), an inbound event channel and, optionally, a [`DetailPoller`] for per-item details of
/// type `D`. All mutation happens inside [`BoundList::tick`].
pub struct BoundList<T, W, P, D = ()>
where
    W: WidgetHost<T>,
{
    runtime: Handle,
    container: ScrollContainer<T, W>,
    fetch: FetchCoordinator<P, Vec<T>>,
    detail: Option<DetailBinding<W, T, D>>,
    events: mpsc::UnboundedReceiver<Edit<T>>,
    sender: EventSender<T>,
}

impl<T, W, P> BoundList<T, W, P>
where
    T: Clone + PartialEq + Send + 'static,
    W: WidgetHost<T>,
    P: Send + 'static,
{
    /// Builds the container and a list coordinator that runs `fetch` on `runtime`.
    pub fn new<F, Fut>(runtime: Handle, options: ContainerOptions<T>, host: W, fetch: F) -> Self
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, FetchError>> + Send + 'static,
    {
        let (tx, events) = mpsc::unbounded_channel();
        Self {
            fetch: FetchCoordinator::new(runtime.clone(), fetch),
            runtime,
            container: ScrollContainer::new(options, host),
            detail: None,
            events,
            sender: EventSender { tx },
        }
    }
}

impl<T, W, P, D> BoundList<T, W, P, D>
where
    T: Clone + PartialEq + Send + 'static,
    W: WidgetHost<T>,
    P: Send + 'static,
    D: Send + 'static,
{
    /// Adds periodic detail polling for the visible window.
    ///
    /// `on_details` receives the host and the details that are still visible when they arrive.
    pub fn with_detail_poller<E, F, Fut, H>(
        self,
        options: PollOptions,
        fetch: F,
        on_details: H,
    ) -> BoundList<T, W, P, E>
    where
        E: Send + 'static,
        F: Fn(Vec<T>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<(T, E)>, FetchError>> + Send + 'static,
        H: FnMut(&mut W, Vec<(T, E)>) + Send + 'static,
    {
        let poller = DetailPoller::new(self.runtime.clone(), options, fetch);
        BoundList {
            runtime: self.runtime,
            container: self.container,
            fetch: self.fetch,
            detail: Some(DetailBinding {
                poller,
                on_details: Box::new(on_details),
            }),
            events: self.events,
            sender: self.sender,
        }
    }

    pub fn container(&self) -> &ScrollContainer<T, W> {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut ScrollContainer<T, W> {
        &mut self.container
    }

    pub fn coordinator(&self) -> &FetchCoordinator<P, Vec<T>> {
        &self.fetch
    }

    pub fn detail_poller(&self) -> Option<&DetailPoller<T, D>> {
        self.detail.as_ref().map(|binding| &binding.poller)
    }

    /// A sender for inbound data events.
    pub fn events(&self) -> EventSender<T> {
        self.sender.clone()
    }

    /// `true` while a list fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.fetch.is_fetching()
    }

    pub fn request_refresh(&mut self, params: P) -> FetchToken {
        self.fetch.request_refresh(params)
    }

    pub fn request_page(&mut self, params: P) -> Option<FetchToken> {
        self.fetch.request_page(params)
    }

    pub fn cancel(&mut self) {
        self.fetch.cancel();
    }

    /// Runs one frame: applies queued events, commits a finished fetch, brings the pool in line
    /// with the window and runs a due detail poll.
    ///
    /// Returns whether any widget was acquired or released by the container tick.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        while let Ok(edit) = self.events.try_recv() {
            if !self.apply_event(edit).is_applied() {
                ftrace!("event ignored: no-op edit");
            }
        }

        if let Some(settled) = self.fetch.drain() {
            self.commit(settled);
        }

        let changed = self.container.tick();

        if let Some(binding) = self.detail.as_mut() {
            let details = binding.poller.tick(now_ms, self.container.visible_items());
            if let Some(details) = details.filter(|details| !details.is_empty()) {
                (binding.on_details)(self.container.host_mut(), details);
            }
        }

        changed
    }

    fn apply_event(&mut self, edit: Edit<T>) -> EditOutcome {
        match edit {
            Edit::Added(item) => self.container.item_added(item),
            Edit::Removed(item) => self.container.item_removed(&item),
            Edit::Replaced(items) => self.container.items_replaced(items),
            edit @ Edit::Merged(_) => self.container.apply(edit),
        }
    }

    fn commit(&mut self, settled: Settled<Vec<T>>) {
        match settled {
            Settled::Committed {
                mode: CommitMode::Replace,
                value,
                ..
            } => self.container.commit_replace(value),
            Settled::Committed {
                mode: CommitMode::Merge,
                value,
                ..
            } => self.container.commit_merge(value),
            Settled::Failed {
                mode: CommitMode::Replace,
                reason,
                ..
            } => self.container.commit_failure(&reason),
            Settled::Failed {
                mode: CommitMode::Merge,
                reason,
                ..
            } => self.container.surface_error(&reason),
            Settled::Cancelled { .. } => {
                ftrace!("fetch ended cancelled; list unchanged");
            }
        }
    }
}

impl<T, W, P, D> std::fmt::Debug for BoundList<T, W, P, D>
where
    W: WidgetHost<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundList")
            .field("container", &self.container)
            .field("fetch", &self.fetch)
            .field("detail", &self.detail.as_ref().map(|binding| &binding.poller))
            .finish_non_exhaustive()
    }
}
