//! In-memory, column-major block.
//!
//! Each column is one time step and holds one value per series, in
//! series-metadata order. This is the block the default controller builds and
//! the one tests feed into operators.

use std::sync::Arc;

use crate::block::{Block, BlockMeta, Builder, Step, StepIter};
use crate::error::{Error, Result};
use crate::tags::SeriesMeta;

#[derive(Debug, Clone, Default)]
pub struct ColumnBlock {
    meta: BlockMeta,
    series_meta: Vec<SeriesMeta>,
    columns: Vec<Vec<f64>>,
    stray_values: usize,
}

impl ColumnBlock {
    /// Build a block from per-series rows of values.
    ///
    /// Every series must carry exactly `steps` values; `steps` is explicit so
    /// a block with no series still has a time axis.
    pub fn from_series(
        meta: BlockMeta,
        steps: usize,
        series: Vec<(SeriesMeta, Vec<f64>)>,
    ) -> Result<Self> {
        let mut columns = vec![Vec::with_capacity(series.len()); steps];
        let mut series_meta = Vec::with_capacity(series.len());
        for (sm, values) in series {
            if values.len() != steps {
                return Err(Error::ColumnLength {
                    column: series_meta.len(),
                    expected: steps,
                    actual: values.len(),
                });
            }
            for (col, v) in columns.iter_mut().zip(values) {
                col.push(v);
            }
            series_meta.push(sm);
        }
        Ok(Self {
            meta,
            series_meta,
            columns,
            stray_values: 0,
        })
    }

    pub fn meta(&self) -> &BlockMeta {
        &self.meta
    }

    pub fn series_meta(&self) -> &[SeriesMeta] {
        &self.series_meta
    }

    pub fn step_count(&self) -> usize {
        self.columns.len()
    }

    fn validate(&self) -> Result<()> {
        if self.stray_values > 0 {
            return Err(Error::Invariant(format!(
                "{} values appended outside allocated columns",
                self.stray_values
            )));
        }
        let expected = self.series_meta.len();
        for (column, col) in self.columns.iter().enumerate() {
            if col.len() != expected {
                return Err(Error::ColumnLength {
                    column,
                    expected,
                    actual: col.len(),
                });
            }
        }
        Ok(())
    }
}

impl Block for ColumnBlock {
    fn step_iter(&self) -> Result<Box<dyn StepIter + '_>> {
        self.validate()?;
        Ok(Box::new(ColumnStepIter {
            block: self,
            next_idx: 0,
        }))
    }
}

struct ColumnStepIter<'a> {
    block: &'a ColumnBlock,
    // One past the current step; 0 means `next` has not been called yet.
    next_idx: usize,
}

impl StepIter for ColumnStepIter<'_> {
    fn next(&mut self) -> bool {
        if self.next_idx >= self.block.columns.len() {
            // Park past the end so `current` fails after exhaustion.
            self.next_idx = self.block.columns.len() + 1;
            return false;
        }
        self.next_idx += 1;
        true
    }

    fn current(&self) -> Result<Step<'_>> {
        let steps = self.block.columns.len();
        let index = self.next_idx.wrapping_sub(1);
        let values = self
            .block
            .columns
            .get(index)
            .ok_or(Error::StepOutOfRange { index, steps })?;
        Ok(Step {
            time: self.block.meta.bounds.time_for_index(index)?,
            values,
        })
    }

    fn step_count(&self) -> usize {
        self.block.columns.len()
    }

    fn series_meta(&self) -> &[SeriesMeta] {
        &self.block.series_meta
    }

    fn meta(&self) -> &BlockMeta {
        &self.block.meta
    }
}

/// `Builder` producing a `ColumnBlock`.
#[derive(Debug)]
pub struct ColumnBlockBuilder {
    block: ColumnBlock,
}

impl ColumnBlockBuilder {
    pub fn new(meta: BlockMeta, series_meta: Vec<SeriesMeta>) -> Self {
        Self {
            block: ColumnBlock {
                meta,
                series_meta,
                columns: Vec::new(),
                stray_values: 0,
            },
        }
    }
}

impl Builder for ColumnBlockBuilder {
    fn add_cols(&mut self, num: usize) -> Result<()> {
        let width = self.block.series_meta.len();
        self.block
            .columns
            .extend(std::iter::repeat_with(|| Vec::with_capacity(width)).take(num));
        Ok(())
    }

    fn append_value(&mut self, row: usize, value: f64) {
        match self.block.columns.get_mut(row) {
            Some(col) => col.push(value),
            None => self.block.stray_values += 1,
        }
    }

    fn build(self: Box<Self>) -> Arc<dyn Block> {
        Arc::new(self.block)
    }
}
