//! Default controller: hands out column block builders under the configured
//! block limits.

use std::sync::Arc;

use stepql_core::prelude::{
    Block, BlockMeta, Builder, ColumnBlockBuilder, EngineConfig, Error, Result, SeriesMeta,
};
use stepql_operators::Controller;

#[derive(Debug, Clone, Default)]
pub struct ColumnController {
    cfg: EngineConfig,
}

impl ColumnController {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }
}

impl Controller for ColumnController {
    fn block_builder(
        &self,
        meta: BlockMeta,
        series_meta: Vec<SeriesMeta>,
    ) -> Result<Box<dyn Builder>> {
        if let Some(limit) = self.cfg.max_series_per_block {
            if series_meta.len() > limit {
                return Err(Error::SeriesLimit {
                    requested: series_meta.len(),
                    limit,
                });
            }
        }
        Ok(Box::new(LimitedBuilder {
            inner: ColumnBlockBuilder::new(meta, series_meta),
            cols: 0,
            max_cols: self.cfg.max_steps_per_block,
        }))
    }
}

/// Column builder that refuses to grow past the step cap.
struct LimitedBuilder {
    inner: ColumnBlockBuilder,
    cols: usize,
    max_cols: Option<usize>,
}

impl Builder for LimitedBuilder {
    fn add_cols(&mut self, num: usize) -> Result<()> {
        let requested = self.cols.saturating_add(num);
        if let Some(limit) = self.max_cols {
            if requested > limit {
                return Err(Error::StepLimit { requested, limit });
            }
        }
        self.inner.add_cols(num)?;
        self.cols = requested;
        Ok(())
    }

    fn append_value(&mut self, row: usize, value: f64) {
        self.inner.append_value(row, value);
    }

    fn build(self: Box<Self>) -> Arc<dyn Block> {
        Box::new(self.inner).build()
    }
}
