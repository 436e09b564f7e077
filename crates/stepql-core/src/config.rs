//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on series in any block the controller builds.
    pub max_series_per_block: Option<usize>,

    /// Upper bound on time columns allocated for any built block.
    pub max_steps_per_block: Option<usize>,
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `STEPQL_MAX_SERIES_PER_BLOCK`: series cap per built block
    /// - `STEPQL_MAX_STEPS_PER_BLOCK`: step cap per built block
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(s) = lookup("STEPQL_MAX_SERIES_PER_BLOCK") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_series_per_block = Some(v);
            }
        }

        if let Some(s) = lookup("STEPQL_MAX_STEPS_PER_BLOCK") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_steps_per_block = Some(v);
            }
        }

        cfg
    }
}
