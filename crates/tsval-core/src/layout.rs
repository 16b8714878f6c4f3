//! Output layout: every path the pipeline reads or writes is derived here.
//!
//! ```text
//! <out_root>/generatedSchemas/<module>.schema.json
//! <source_root>/validationCode/<module>.validate.js
//! <source_root>/validationCode/runtime.js
//! <source_root>/validationCode/validation.ts
//! ```

use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::fs;

/// Well-known manifest file name searched for under the source root.
pub const MANIFEST_FILE_NAME: &str = "toJSONSchema.ts";
/// Suffix of persisted schema documents.
pub const SCHEMA_SUFFIX: &str = ".schema.json";
/// Suffix of compiled validator modules.
pub const VALIDATION_FILE_SUFFIX: &str = ".validate.js";
/// Schema directory name under the output root.
pub const SCHEMAS_DIR: &str = "generatedSchemas";
/// Validation code directory name under the source root.
pub const VALIDATION_CODE_DIR: &str = "validationCode";
/// Static stub module that satisfies rewritten helper references.
pub const RUNTIME_MODULE_FILE: &str = "runtime.js";
/// Default aggregated module file name.
pub const AGGREGATED_FILE_NAME: &str = "validation.ts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    source_root: PathBuf,
    out_root: PathBuf,
    aggregated_file_name: String,
}

impl OutputLayout {
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>, out_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            out_root: out_root.into(),
            aggregated_file_name: AGGREGATED_FILE_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_aggregated_file_name(mut self, name: impl Into<String>) -> Self {
        self.aggregated_file_name = name.into();
        self
    }

    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    #[must_use]
    pub fn out_root(&self) -> &Path {
        &self.out_root
    }

    #[must_use]
    pub fn schemas_dir(&self) -> PathBuf {
        self.out_root.join(SCHEMAS_DIR)
    }

    #[must_use]
    pub fn validation_dir(&self) -> PathBuf {
        self.source_root.join(VALIDATION_CODE_DIR)
    }

    #[must_use]
    pub fn runtime_module_path(&self) -> PathBuf {
        self.validation_dir().join(RUNTIME_MODULE_FILE)
    }

    #[must_use]
    pub fn aggregated_path(&self) -> PathBuf {
        self.validation_dir().join(&self.aggregated_file_name)
    }

    /// Schema document path for a module source file.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidPath` when the source has no file name.
    pub fn schema_path_for_module(&self, module_source: &Path) -> Result<PathBuf, CoreError> {
        let base = module_base_name(module_source).ok_or_else(|| CoreError::InvalidPath {
            path: module_source.to_path_buf(),
            reason: "module source has no file name".to_string(),
        })?;
        Ok(self.schemas_dir().join(format!("{base}{SCHEMA_SUFFIX}")))
    }

    /// Validator module path for a schema document (suffix swapped).
    ///
    /// # Errors
    /// Returns `CoreError::InvalidPath` when the file does not end in
    /// [`SCHEMA_SUFFIX`].
    pub fn validator_path_for_schema(&self, schema_path: &Path) -> Result<PathBuf, CoreError> {
        let file_name = schema_path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(SCHEMA_SUFFIX))
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| CoreError::InvalidPath {
                path: schema_path.to_path_buf(),
                reason: format!("expected a file ending in '{SCHEMA_SUFFIX}'"),
            })?;
        Ok(self
            .validation_dir()
            .join(format!("{file_name}{VALIDATION_FILE_SUFFIX}")))
    }

    /// Create the schema and validation-code directories.
    ///
    /// # Errors
    /// Returns `CoreError::FileSystem` if either directory cannot be created.
    pub fn ensure_dirs(&self) -> Result<(), CoreError> {
        fs::ensure_dir(&self.schemas_dir())?;
        fs::ensure_dir(&self.validation_dir())
    }
}

/// Module base name: the file name without its extension, with a trailing
/// `.d` removed for declaration files.
#[must_use]
pub fn module_base_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let stem = stem.strip_suffix(".d").unwrap_or(stem);
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Path of `target` relative to `from_dir`, using `/` separators.
///
/// Both paths are compared component-wise; they should share a root.
#[must_use]
pub fn relative_path(from_dir: &Path, target: &Path) -> String {
    let from: Vec<_> = from_dir.components().collect();
    let to: Vec<_> = target.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = std::iter::repeat_n("..".to_string(), from.len() - common).collect();
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}
