use std::fmt;

/// Why a fetch produced no result.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The operation observed its cancellation token and stopped early.
    #[error("fetch cancelled")]
    Cancelled,
    /// The retrieval itself failed (network, parse, storage...).
    #[error("fetch failed: {0}")]
    Failed(String),
}

impl FetchError {
    pub fn failed(reason: impl fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::failed(err)
    }
}
