//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A path could neither be read from config nor derived from tsconfig.
    #[error("Missing path '{field}': set it in tsval.toml, TSVAL_PATHS__*, or tsconfig.json compilerOptions")]
    MissingPath { field: String },

    /// `tsconfig.json` could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    TsConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `tsconfig.json` is not valid JSON (after comments and trailing commas are removed).
    #[error("Failed to parse {}: {source}", path.display())]
    TsConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
