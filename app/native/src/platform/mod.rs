//! Platform helpers shared by every module.
//!
//! - [`path`] - Path expansion and target classification
//! - [`thread`] - Named threads, UI dispatch queue and repeating timers

pub mod path;
pub mod thread;

pub use thread::{RepeatingTask, UiQueue, UiSender, UiTask, spawn_named_thread};
