#![forbid(unsafe_code)]
//! stepql-core: shared types for the step-oriented query engine.
//!
//! Everything here is pure data plus the abstract block interfaces that
//! operators consume. Concrete controllers and execution live in `stepql-exec`.

pub mod block;
pub mod column;
pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod matching;
pub mod prelude;
pub mod tags;

pub use error::{Error, Result};
