// src/exec/mod.rs

//! Pipeline execution layer.
//!
//! [`backend`] provides the `PipelineExecutor` trait the runtime drives and
//! the `RegistryExecutor` used in production; tests replace it with a fake.

pub mod backend;

pub use backend::{PipelineExecutor, RegistryExecutor};
