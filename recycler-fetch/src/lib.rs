//! Single-flight, cancellable refresh coordination for `recycler` lists.
//!
//! The `recycler` crate is synchronous and UI-agnostic. This crate adds the asynchronous side a
//! server-fed list needs, on top of a tokio runtime:
//!
//! - [`FetchCoordinator`]: at most one committing fetch at a time; a newer request cancels the
//!   previous one and only the newest generation may commit
//! - [`DetailPoller`]: interval-driven, batched detail refresh for the visible window
//! - [`BoundList`]: a `ScrollContainer` wired to a coordinator, a detail poller and an inbound
//!   event channel, driven by one `tick` per frame
//!
//! Fetches run on the runtime's worker threads. Their results are handed back through a
//! lock-guarded queue and applied on the update path; nothing here blocks a tick.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod bound;
mod coordinator;
mod detail;
mod error;
mod handoff;
mod token;


pub use bound::{BoundList, EventSender};
pub use coordinator::{FetchCoordinator, FetchFn, FetchState, Settled};
pub use detail::{DetailPoller, PollOptions};
pub use error::FetchError;
pub use handoff::CommitMode;
pub use token::{FetchToken, Generation, cancellable_sleep};

pub use tokio_util::sync::CancellationToken;
