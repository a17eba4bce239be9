use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Identifies one refresh request. Generations only ever increase per coordinator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generation(pub(crate) u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A generation plus the cancellation handle handed to the retrieval operation.
///
/// Cloning a token shares its cancellation state.
#[derive(Clone, Debug)]
pub struct FetchToken {
    generation: Generation,
    cancel: CancellationToken,
}

impl FetchToken {
    pub(crate) fn new(generation: Generation, cancel: CancellationToken) -> Self {
        Self { generation, cancel }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Sleeps for `duration` unless `cancel` fires first. Returns `true` if cancelled.
///
/// Meant for timed backoff inside retrieval operations.
pub async fn cancellable_sleep(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}
