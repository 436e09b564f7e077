//! Processor trait + common interfaces.
//!
//! The hosting graph builds a processor once per plan (bound to a controller)
//! and calls `process` with realized input blocks.

use std::sync::Arc;

use stepql_core::prelude::{Block, BlockMeta, Builder, SeriesMeta};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    // Reserved for an upstream bounds check; no processor raises it yet.
    #[error("block bounds are mismatched")]
    MismatchedBounds,

    #[error("block step counts are mismatched: left {left}, right {right}")]
    MismatchedStepCounts { left: usize, right: usize },

    // Reserved for tag validation; no processor raises it yet.
    #[error("block tags conflict")]
    ConflictingTags,

    /// Iterator/builder failures, passed through as-is.
    #[error(transparent)]
    Block(#[from] stepql_core::Error),
}

/// Source of output builders for processors.
pub trait Controller: Send + Sync {
    fn block_builder(
        &self,
        meta: BlockMeta,
        series_meta: Vec<SeriesMeta>,
    ) -> stepql_core::Result<Box<dyn Builder>>;
}

/// A binary block operator.
///
/// Invariants:
/// - Inputs are never mutated.
/// - No state carries over between calls; any failure leaves nothing behind.
pub trait Processor: Send + Sync {
    fn process(&self, lhs: &dyn Block, rhs: &dyn Block) -> Result<Arc<dyn Block>, OpError>;
}
