//! Schema documents on disk → validator modules on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tsval_core::layout::SCHEMA_SUFFIX;
use tsval_core::{OutputLayout, SchemaDocument, fs, walk};

use crate::backend::{StandaloneBackend, ValidatorBackend};
use crate::error::CompileError;
use crate::program::{ValidationError, ValidatorProgram};
use crate::runtime::{RUNTIME_JS, rewrite_internal_refs};

/// Every schema document under `dir`, sorted by file name.
#[must_use]
pub fn discover_schemas(dir: &Path) -> Vec<PathBuf> {
    walk::find_files(dir, |path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(SCHEMA_SUFFIX))
    })
}

/// A parsed schema document with its derived paths and metadata.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub schema_path: PathBuf,
    pub module_path: PathBuf,
    pub document: SchemaDocument,
    /// Definition names in document order.
    pub refs: Vec<String>,
    pub exported: Option<Vec<String>>,
}

/// Read and parse the schema at `path`.
///
/// # Errors
/// `Core` for unreadable files or a path without the schema suffix, `Load`
/// for malformed JSON.
pub fn load_schema(path: &Path, layout: &OutputLayout) -> Result<LoadedSchema, CompileError> {
    let module_path = layout.validator_path_for_schema(path)?;
    let text = fs::read_file(path)?;
    let document = SchemaDocument::from_json(&text).map_err(|source| CompileError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedSchema {
        schema_path: path.to_path_buf(),
        module_path,
        refs: document.definition_names(),
        exported: document.exported.clone(),
        document,
    })
}

/// A schema compiled into a validator module.
#[derive(Debug, Clone)]
pub struct CompiledValidator {
    pub schema_path: PathBuf,
    /// Where the module source was (or will be) written.
    pub module_path: PathBuf,
    pub document: SchemaDocument,
    pub refs: Vec<String>,
    pub exported: Option<Vec<String>>,
    /// Module source with internal references already rewritten.
    pub source: String,
    pub program: ValidatorProgram,
}

impl CompiledValidator {
    /// Whether `name` passes the schema's allow-list.
    #[must_use]
    pub fn is_exported(&self, name: &str) -> bool {
        self.document.is_exported(name)
    }

    /// Run one definition's compiled rules against `data` in-process.
    ///
    /// `None` when the schema has no definition called `definition`.
    #[must_use]
    pub fn validate(
        &self,
        definition: &str,
        data: &serde_json::Value,
    ) -> Option<Vec<ValidationError>> {
        self.program.validate_definition(definition, data)
    }
}

/// A schema that could not be loaded or compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSchema {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct CompileReport {
    /// Successfully written validators, in input order.
    pub compiled: Vec<CompiledValidator>,
    pub failed: Vec<FailedSchema>,
}

impl CompileReport {
    /// Add one unit's outcome; failures are logged and kept as text.
    pub fn record(&mut self, path: &Path, result: Result<CompiledValidator, CompileError>) {
        match result {
            Ok(compiled) => self.compiled.push(compiled),
            Err(error) => {
                tracing::warn!(schema = %path.display(), %error, "skipping schema");
                self.failed.push(FailedSchema {
                    path: path.to_path_buf(),
                    error: error.to_string(),
                });
            }
        }
    }
}

pub struct ValidatorCompiler {
    backend: Box<dyn ValidatorBackend>,
}

impl Default for ValidatorCompiler {
    fn default() -> Self {
        Self::standalone()
    }
}

impl ValidatorCompiler {
    #[must_use]
    pub fn new(backend: Box<dyn ValidatorBackend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn standalone() -> Self {
        Self::new(Box::new(StandaloneBackend))
    }

    /// Compile a loaded schema without touching the filesystem.
    ///
    /// # Errors
    /// Whatever the backend reports.
    pub fn compile(&self, loaded: LoadedSchema) -> Result<CompiledValidator, CompileError> {
        let module = self.backend.compile(&loaded.document)?;
        let source = rewrite_internal_refs(&module.code)?;
        Ok(CompiledValidator {
            schema_path: loaded.schema_path,
            module_path: loaded.module_path,
            document: loaded.document,
            refs: loaded.refs,
            exported: loaded.exported,
            source,
            program: module.program,
        })
    }

    /// Load, compile and write the validator module for one schema file.
    ///
    /// # Errors
    /// Any load, compile or write failure for this schema.
    pub fn compile_path(
        &self,
        path: &Path,
        layout: &OutputLayout,
    ) -> Result<CompiledValidator, CompileError> {
        let compiled = self.compile(load_schema(path, layout)?)?;
        fs::write_file(&compiled.module_path, &compiled.source)?;
        tracing::debug!(
            schema = %path.display(),
            module = %compiled.module_path.display(),
            definitions = compiled.refs.len(),
            "compiled validator"
        );
        Ok(compiled)
    }

    /// Write the helper module the validators import.
    ///
    /// # Errors
    /// `Core` when the validation directory cannot be created or written.
    pub fn write_runtime(layout: &OutputLayout) -> Result<PathBuf, CompileError> {
        fs::ensure_dir(&layout.validation_dir())?;
        let path = layout.runtime_module_path();
        fs::write_file(&path, RUNTIME_JS)?;
        Ok(path)
    }

    /// Compile every path in order. A failing schema is logged and
    /// recorded; the rest of the batch continues.
    pub fn compile_all(&self, paths: &[PathBuf], layout: &OutputLayout) -> CompileReport {
        let mut report = CompileReport::default();
        for path in paths {
            report.record(path, self.compile_path(path, layout));
        }
        report
    }
}
