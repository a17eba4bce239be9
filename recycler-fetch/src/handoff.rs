use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::{FetchError, Generation};

/// How a committed result is applied to the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommitMode {
    /// Full replace of the backing collection.
    Replace,
    /// Append items not already present (pagination).
    Merge,
}

/// A finished fetch waiting for the update path.
#[derive(Debug)]
pub(crate) struct Completion<R> {
    pub(crate) generation: Generation,
    pub(crate) mode: CommitMode,
    pub(crate) outcome: Result<R, FetchError>,
}

struct State<R> {
    /// The only generation allowed to commit, if any.
    current: Option<Generation>,
    queue: VecDeque<Completion<R>>,
}

/// Lock-guarded hand-off between fetch workers and the update path.
///
/// The current generation lives under the same lock as the queue: a worker's "am I still
/// wanted?" check and its push cannot interleave with a new request on the update path.
pub(crate) struct Handoff<R> {
    state: Mutex<State<R>>,
    ready: Condvar,
}

impl<R> Handoff<R> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                current: None,
                queue: VecDeque::new(),
            }),
            ready: Condvar::new(),
        }
    }

    /// Makes `generation` (or nothing) the only generation allowed to commit and drops anything
    /// already queued for older ones.
    pub(crate) fn set_current(&self, generation: Option<Generation>) {
        let mut state = self.state.lock();
        state.current = generation;
        let before = state.queue.len();
        state
            .queue
            .retain(|c| Some(c.generation) == generation);
        let dropped = before - state.queue.len();
        if dropped > 0 {
            ftrace!(dropped, "handoff: purged stale completions");
        }
    }

    /// Called on the worker. Queues the outcome if it is still wanted; returns whether it was.
    ///
    /// A `Cancelled` outcome of the current generation is queued too: the operation gave up on
    /// its own, and the update path still has to leave `Fetching`.
    pub(crate) fn complete(
        &self,
        generation: Generation,
        mode: CommitMode,
        outcome: Result<R, FetchError>,
    ) -> bool {
        let mut state = self.state.lock();
        if state.current != Some(generation) {
            ftrace!(%generation, "handoff: stale fetch discarded");
            return false;
        }
        state.queue.push_back(Completion {
            generation,
            mode,
            outcome,
        });
        self.ready.notify_all();
        true
    }

    /// Called on the update path. Returns the newest completion for the current generation.
    pub(crate) fn take(&self) -> Option<Completion<R>> {
        let mut state = self.state.lock();
        let current = state.current?;
        let mut found = None;
        while let Some(completion) = state.queue.pop_front() {
            if completion.generation == current {
                found = Some(completion);
            }
        }
        if found.is_some() {
            // Retired on commit: nothing else may land until the next request.
            state.current = None;
        }
        found
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.state.lock().queue.is_empty()
    }

    /// Parks the calling thread until something is queued or `timeout` elapses.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.queue.is_empty() {
            if self.ready.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        !state.queue.is_empty()
    }
}
