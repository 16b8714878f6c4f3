//! Parser error types for tsval-parser.

use std::path::PathBuf;

use tsval_core::CoreError;

/// Manifest-stage failures. Both variants abort a run.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Unable to find {name} under {}", root.display())]
    ManifestNotFound { root: PathBuf, name: String },

    #[error("Unable to read manifest {}: {reason}", path.display())]
    ManifestUnreadable { path: PathBuf, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Type resolution failures raised while introspecting a module.
#[derive(Debug, thiserror::Error)]
pub enum IntrospectError {
    #[error("Cannot resolve module '{specifier}' from {}", from.display())]
    ModuleNotFound { specifier: String, from: PathBuf },

    #[error("Module {} has syntax errors near: {snippet}", path.display())]
    ModuleSyntax { path: PathBuf, snippet: String },

    #[error("No type named '{name}' in {}", module.display())]
    TypeNotFound { name: String, module: PathBuf },

    #[error("Unsupported {kind} type `{text}` in {}", module.display())]
    UnsupportedType {
        kind: String,
        text: String,
        module: PathBuf,
    },

    #[error("Generic type '{name}' expects {expected} type argument(s), got {found}")]
    TypeArguments {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}
