//! Schema builder error types.

use std::path::PathBuf;

use tsval_core::CoreError;
use tsval_parser::IntrospectError;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Cannot resolve module '{module}' relative to {}", dir.display())]
    ModuleNotFound { module: String, dir: PathBuf },

    #[error("Failed to build schema for '{type_name}': {source}")]
    Introspect {
        type_name: String,
        #[source]
        source: IntrospectError,
    },

    #[error("Schema for '{module}' would overwrite {} already written for '{first}'", path.display())]
    OutputCollision {
        module: String,
        first: String,
        path: PathBuf,
    },

    #[error("Failed to serialize schema for {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}
