//! Convenient re-exports for downstream crates.

pub use crate::block::{Block, BlockMeta, Bounds, Builder, Step, StepIter};
pub use crate::column::{ColumnBlock, ColumnBlockBuilder};
pub use crate::config::EngineConfig;
pub use crate::error::{Error, Result};
pub use crate::hash::{signature_func, Signature};
pub use crate::id::NodeId;
pub use crate::matching::VectorMatching;
pub use crate::tags::{SeriesMeta, Tags};
