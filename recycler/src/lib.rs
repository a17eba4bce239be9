//! A headless, object-pooled list windowing engine.
//!
//! Large or server-fed lists (rosters, browsers, leaderboards) only ever need a handful of live
//! widgets. This crate decides which logical items currently have one, and keeps that mapping
//! correct while items are scrolled, appended, removed or replaced wholesale:
//!
//! - [`Windower`]: scroll offset → the index range that must be live
//! - [`ItemPool`]: a bounded set of recyclable widget slots, contiguous by index
//! - [`Reconciler`]: structural edits of the backing collection, applied with minimal churn
//! - [`ScrollContainer`]: the per-frame orchestrator tying the three together
//!
//! It is UI-agnostic. A TUI/GUI layer implements [`WidgetHost`] to create, move and recycle the
//! actual widgets. For cancellable asynchronous refreshes, see the `recycler-fetch` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod container;
mod host;
mod options;
mod pool;
mod reconciler;
mod state;
mod types;
mod windower;

#[cfg(test)]
mod tests;

pub use container::ScrollContainer;
pub use host::WidgetHost;
pub use options::{ContainerConfig, ContainerOptions, OnWindowChangeCallback};
pub use pool::{ItemPool, PoolEntry, PoolError};
pub use reconciler::Reconciler;
pub use state::ScrollState;
pub use types::{Edit, EditOutcome, ListStatus, WindowRange};
pub use windower::{Windower, visible_window};
