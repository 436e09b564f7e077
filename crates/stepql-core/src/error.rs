use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("step index {index} out of range for {steps} steps")]
    StepOutOfRange { index: usize, steps: usize },

    #[error("column {column} holds {actual} values, expected {expected}")]
    ColumnLength {
        column: usize,
        expected: usize,
        actual: usize,
    },

    #[error("block has {requested} series, limit is {limit}")]
    SeriesLimit { requested: usize, limit: usize },

    #[error("block has {requested} steps, limit is {limit}")]
    StepLimit { requested: usize, limit: usize },

    // Block implementations backed by remote or on-disk storage map their
    // failures into this variant.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}
