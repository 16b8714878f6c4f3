//! Aggregation error types.

use std::path::PathBuf;

use tsval_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error(
        "Duplicate validator '{name}': defined by {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateValidator {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Failed to generate validator id: {0}")]
    IdGeneration(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}
