#![forbid(unsafe_code)]
//! stepql-exec: controller, engine, and metrics.
//!
//! The engine evaluates one operator at a time against blocks that upstream
//! nodes have already realized; graph scheduling lives with the caller.

pub mod controller;
pub mod engine;
pub mod metrics;

pub use controller::ColumnController;
pub use engine::{Engine, ExecError};
