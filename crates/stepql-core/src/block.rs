//! Block interfaces consumed by operators.
//!
//! A block is a time-aligned set of series. Operators read it through a
//! forward-only `StepIter` and produce new blocks through a `Builder`; blocks
//! themselves are never mutated once built.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tags::{SeriesMeta, Tags};

/// Time range covered by a block, in unix nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub start: i64,
    pub duration: i64,
    pub step_size: i64,
}

impl Bounds {
    pub fn new(start: i64, duration: i64, step_size: i64) -> Self {
        Self {
            start,
            duration,
            step_size,
        }
    }

    /// Number of steps in `[start, start + duration)`.
    pub fn steps(&self) -> usize {
        if self.step_size <= 0 || self.duration <= 0 {
            return 0;
        }
        (self.duration / self.step_size) as usize
    }

    /// Timestamp of step `index`, counted from `start`.
    ///
    /// Blocks may carry more columns than their bounds describe, so only
    /// arithmetic overflow is rejected here.
    pub fn time_for_index(&self, index: usize) -> Result<i64> {
        i64::try_from(index)
            .ok()
            .and_then(|i| i.checked_mul(self.step_size))
            .and_then(|offset| self.start.checked_add(offset))
            .ok_or(Error::StepOutOfRange {
                index,
                steps: self.steps(),
            })
    }
}

/// Block-level metadata: bounds plus the tags shared by every series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMeta {
    pub bounds: Bounds,
    pub tags: Tags,
}

/// One time slice. `values[i]` belongs to the iterator's `series_meta()[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<'a> {
    pub time: i64,
    pub values: &'a [f64],
}

impl<'a> Step<'a> {
    pub fn values(&self) -> &'a [f64] {
        self.values
    }
}

pub trait Block: Send + Sync {
    /// Open a fresh cursor over the block's time axis.
    fn step_iter(&self) -> Result<Box<dyn StepIter + '_>>;
}

/// Forward-only cursor over the steps of a block.
///
/// `next` must be called before the first `current`; it returns `false` once
/// `step_count()` steps have been visited. Series metadata is fixed for the
/// iterator's lifetime.
pub trait StepIter {
    fn next(&mut self) -> bool;

    fn current(&self) -> Result<Step<'_>>;

    fn step_count(&self) -> usize;

    fn series_meta(&self) -> &[SeriesMeta];

    fn meta(&self) -> &BlockMeta;
}

/// Write-only accumulator for a new block.
///
/// Series metadata is fixed when the builder is created; `add_cols` allocates
/// time columns and `append_value` pushes the next series value onto a column.
pub trait Builder {
    fn add_cols(&mut self, num: usize) -> Result<()>;

    fn append_value(&mut self, row: usize, value: f64);

    fn build(self: Box<Self>) -> std::sync::Arc<dyn Block>;
}
