#![forbid(unsafe_code)]
//! stepql: step-aligned block operators for time series queries.
//!
//! Re-exports the workspace crates under one roof:
//! - `stepql_core`: tags, matching rules, signatures, block traits, column blocks.
//! - `stepql_operators`: the `Processor` contract, logical operators, the registry.
//! - `stepql_exec`: the column controller and the engine.

pub use stepql_core;
pub use stepql_core::prelude;
pub use stepql_exec;
pub use stepql_operators;
