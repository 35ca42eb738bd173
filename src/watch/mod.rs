// src/watch/mod.rs

//! File watching.
//!
//! - [`bindings`] maps glob patterns to pipelines composed in the task
//!   registry.
//! - [`watcher`] wires up a cross-platform filesystem watcher (`notify`).
//! - [`event_handler`] turns one changed path into pipeline triggers.
//!
//! It knows nothing about how pipelines run or overlap; that is the engine's
//! job.

pub mod bindings;
pub mod event_handler;
pub mod path_utils;
pub mod watcher;

pub use bindings::{site_bindings, WatchBinding, WatchBindings};
pub use event_handler::process_file_change;
pub use watcher::{spawn_watcher, WatcherHandle};
