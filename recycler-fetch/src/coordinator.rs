use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::handoff::{Completion, Handoff};
use crate::{CommitMode, FetchError, FetchToken, Generation};

/// The caller-supplied retrieval operation.
///
/// It receives the request parameters and the request's cancellation token, and is expected to
/// check the token at its own checkpoints (before the request, mid-transfer, before returning).
pub type FetchFn<P, R> =
    Arc<dyn Fn(P, CancellationToken) -> BoxFuture<'static, Result<R, FetchError>> + Send + Sync>;

/// Where the coordinator is in its request cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching(Generation),
}

/// How the current request ended.
#[derive(Debug, PartialEq)]
pub enum Settled<R> {
    Committed {
        generation: Generation,
        mode: CommitMode,
        value: R,
    },
    Failed {
        generation: Generation,
        mode: CommitMode,
        reason: String,
    },
    /// The operation gave up on its own (e.g. the server aborted). Nothing to apply.
    Cancelled {
        generation: Generation,
        mode: CommitMode,
    },
}

/// Runs one cancellable retrieval at a time and lets only the newest request commit.
///
/// Every request gets a fresh [`Generation`]. Starting a request cancels the previous token
/// synchronously, before the new operation is spawned, so two requests are never current at
/// once. Superseded operations may keep running on the runtime; whatever they produce is
/// dropped on the worker (or, at the latest, when the update path calls
/// [`FetchCoordinator::drain`]).
///
/// The coordinator itself lives on the update path and never blocks.
pub struct FetchCoordinator<P, R> {
    runtime: Handle,
    fetch: FetchFn<P, R>,
    handoff: Arc<Handoff<R>>,
    root: CancellationToken,
    current: Option<FetchToken>,
    last_generation: u64,
    state: FetchState,
    in_flight: Arc<AtomicUsize>,
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<P, R> FetchCoordinator<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Creates a coordinator that spawns `fetch` on `runtime`.
    pub fn new<F, Fut>(runtime: Handle, fetch: F) -> Self
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, FetchError>> + Send + 'static,
    {
        Self::from_fn(runtime, Arc::new(move |params, cancel| fetch(params, cancel).boxed()))
    }

    pub fn from_fn(runtime: Handle, fetch: FetchFn<P, R>) -> Self {
        Self {
            runtime,
            fetch,
            handoff: Arc::new(Handoff::new()),
            root: CancellationToken::new(),
            current: None,
            last_generation: 0,
            state: FetchState::Idle,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.state, FetchState::Fetching(_))
    }

    /// The token of the request currently allowed to commit.
    pub fn current(&self) -> Option<&FetchToken> {
        self.current.as_ref()
    }

    pub fn last_generation(&self) -> Generation {
        Generation(self.last_generation)
    }

    /// Spawned operations that have not finished yet, superseded ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Cancels whatever is in flight and starts a full-replace fetch.
    pub fn request_refresh(&mut self, params: P) -> FetchToken {
        self.start(params, CommitMode::Replace)
    }

    /// Starts a merge fetch (next page), unless a fetch is already in flight.
    ///
    /// A page request never supersedes a running refresh; `None` means it was refused.
    pub fn request_page(&mut self, params: P) -> Option<FetchToken> {
        if self.is_fetching() {
            fdebug!("request_page refused: fetch in flight");
            return None;
        }
        Some(self.start(params, CommitMode::Merge))
    }

    /// Cancels the in-flight fetch, if any, without starting another.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            fdebug!(generation = %token.generation(), "fetch cancelled");
            token.cancel();
        }
        self.handoff.set_current(None);
        self.state = FetchState::Idle;
    }

    /// Takes the committed result, if the current request has finished.
    ///
    /// Call this from the update path (typically once per frame). It never blocks.
    pub fn drain(&mut self) -> Option<Settled<R>> {
        let Completion {
            generation,
            mode,
            outcome,
        } = self.handoff.take()?;

        debug_assert_eq!(
            self.current.as_ref().map(FetchToken::generation),
            Some(generation),
            "completion committed for a non-current generation"
        );
        self.current = None;
        self.state = FetchState::Idle;

        Some(match outcome {
            Ok(value) => {
                fdebug!(%generation, ?mode, "fetch committed");
                Settled::Committed {
                    generation,
                    mode,
                    value,
                }
            }
            Err(FetchError::Cancelled) => {
                fdebug!(%generation, ?mode, "fetch ended cancelled");
                Settled::Cancelled { generation, mode }
            }
            Err(err) => {
                fwarn!(%generation, error = %err, "fetch failed");
                Settled::Failed {
                    generation,
                    mode,
                    reason: match err {
                        FetchError::Failed(reason) => reason,
                        other => other.to_string(),
                    },
                }
            }
        })
    }

    /// Parks the calling thread until a completion is queued or `timeout` elapses.
    ///
    /// Not for the UI thread; useful for headless hosts and tests.
    pub fn wait_for_completion(&self, timeout: Duration) -> bool {
        self.handoff.wait(timeout)
    }

    /// `true` when a completion is queued and [`FetchCoordinator::drain`] would act on it.
    pub fn has_pending(&self) -> bool {
        self.handoff.has_pending()
    }

    fn start(&mut self, params: P, mode: CommitMode) -> FetchToken {
        if let Some(previous) = self.current.take() {
            fdebug!(generation = %previous.generation(), "fetch superseded");
            previous.cancel();
        }

        self.last_generation += 1;
        let generation = Generation(self.last_generation);
        let token = FetchToken::new(generation, self.root.child_token());
        self.handoff.set_current(Some(generation));
        self.current = Some(token.clone());
        self.state = FetchState::Fetching(generation);
        fdebug!(%generation, ?mode, "fetch started");

        let cancel = token.cancellation().clone();
        let handoff = Arc::clone(&self.handoff);
        let fetch = Arc::clone(&self.fetch);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let in_flight = InFlight(Arc::clone(&self.in_flight));

        self.runtime.spawn(async move {
            let _in_flight = in_flight;
            if cancel.is_cancelled() {
                ftrace!(%generation, "fetch cancelled before start");
                return;
            }
            // A panicking operation still settles its generation, as a failure.
            let outcome = AssertUnwindSafe(async { fetch(params, cancel.clone()).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    fwarn!(%generation, "fetch panicked");
                    Err(FetchError::failed("fetch panicked"))
                });
            let outcome = if cancel.is_cancelled() {
                Err(FetchError::Cancelled)
            } else {
                outcome
            };
            handoff.complete(generation, mode, outcome);
        });

        token
    }
}

impl<P, R> Drop for FetchCoordinator<P, R> {
    fn drop(&mut self) {
        // Cancels every operation this coordinator ever spawned.
        self.root.cancel();
    }
}

impl<P, R> std::fmt::Debug for FetchCoordinator<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCoordinator")
            .field("state", &self.state)
            .field("last_generation", &self.last_generation)
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
