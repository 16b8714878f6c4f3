//! Policy enums shared by configuration and code generation.
//!
//! All enums use `snake_case` serialization so they read naturally in
//! `tsval.toml` and in `TSVAL_*` environment variables.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DuplicatePolicy
// ---------------------------------------------------------------------------

/// What the aggregator does when two validators would emit a public
/// function with the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first occurrence silently.
    #[default]
    KeepFirst,
    /// Keep the first occurrence; log when the colliding definitions differ.
    Warn,
    /// Abort aggregation.
    Error,
}

impl DuplicatePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeepFirst => "keep_first",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IdStrategy
// ---------------------------------------------------------------------------

/// How import-binding identifiers are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Eight random ASCII letters per validator.
    #[default]
    Random,
    /// `0`, `1`, `2`, ... in batch order. Reproducible output.
    Sequential,
}

impl IdStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
