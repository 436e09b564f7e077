//! Vector matching: which tags decide that two series are "the same" for a
//! binary set operation.

use serde::{Deserialize, Serialize};

/// `on` selects the mode:
/// - `true`: identity is the tags named in `matching_labels` (`on(a, b)`).
/// - `false`: identity is every tag except those named (`ignoring(a, b)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorMatching {
    pub on: bool,
    #[serde(default)]
    pub matching_labels: Vec<String>,
}

impl VectorMatching {
    pub fn on<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            on: true,
            matching_labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ignoring<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            on: false,
            matching_labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}
