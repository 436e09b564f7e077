#![forbid(unsafe_code)]
//! stepql-operators: processors that combine realized blocks.
//!
//! Design intent:
//! - Processors are pure and synchronous; each `process` call consumes two
//!   freshly supplied blocks and yields exactly one block or an error.
//! - Output blocks are always produced through a `Controller`-supplied builder.
//! - Operator kinds are looked up through the `Registry`, never by type.

pub mod logical;
pub mod registry;
pub mod traits;

pub use logical::BaseOp;
pub use registry::{ProcessorFn, Registry};
pub use traits::{Controller, OpError, Processor};
