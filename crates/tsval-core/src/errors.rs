//! Cross-cutting error types for tsval.
//!
//! Stage-specific errors (`ParserError`, `SchemaError`, `CompileError`,
//! `CodegenError`) live in their own crates and wrap [`CoreError`] for file
//! system failures. The CLI converges all of them through `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can be raised by any tsval crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Directory creation, write, or a deletion failure other than "absent".
    #[error("File system error: failed to {action} {}: {source}", path.display())]
    FileSystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A path could not be mapped into the output layout.
    #[error("Invalid output path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },
}

impl CoreError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            action,
            path: path.into(),
            source,
        }
    }
}
