//! Validator compilation error types.

use std::path::PathBuf;

use tsval_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Failed to parse schema {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize schema document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Schema is not a valid draft-07 schema: {reason}")]
    MetaSchema { reason: String },

    #[error("Unresolvable $ref '{pointer}'")]
    UnresolvedRef { pointer: String },

    #[error("Invalid '{keyword}' at {schema_path}: {reason}")]
    InvalidKeyword {
        keyword: String,
        schema_path: String,
        reason: String,
    },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}
