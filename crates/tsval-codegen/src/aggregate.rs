//! Compiled validators → one aggregated module with a public function per
//! definition.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tsval_core::layout::relative_path;
use tsval_core::{DuplicatePolicy, IdStrategy, OutputLayout, fs};
use tsval_validator::CompiledValidator;

use crate::error::CodegenError;
use crate::ids::IdGenerator;
use crate::ir::{GeneratedModule, ImportBinding, PublicFunction, function_name};
use crate::printer::{Printer, TypeScriptPrinter};

pub const HEADER: &str = "Generated by tsval. Do not edit.";

/// A compiled validator with its batch identifier and import binding.
#[derive(Debug)]
pub struct SchemaInstance<'a> {
    pub validator: &'a CompiledValidator,
    pub id: String,
    pub import: ImportBinding,
}

/// A public function dropped because an earlier validator already emits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDuplicate {
    pub name: String,
    pub kept_from: PathBuf,
    pub skipped_from: PathBuf,
    /// Whether the two definitions differ.
    pub differs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub path: PathBuf,
    pub imports: usize,
    pub functions: Vec<String>,
    pub duplicates: Vec<SkippedDuplicate>,
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    policy: DuplicatePolicy,
    ids: IdStrategy,
}

impl Aggregator {
    #[must_use]
    pub const fn new(policy: DuplicatePolicy, ids: IdStrategy) -> Self {
        Self { policy, ids }
    }

    /// Assign ids and import bindings relative to the aggregated file at
    /// `out_path`.
    ///
    /// # Errors
    /// `IdGeneration` when no random id can be drawn.
    pub fn instances<'a>(
        &self,
        validators: &'a [CompiledValidator],
        out_path: &Path,
    ) -> Result<Vec<SchemaInstance<'a>>, CodegenError> {
        let out_dir = out_path.parent().unwrap_or_else(|| Path::new(""));
        let mut ids = IdGenerator::new(self.ids);
        validators
            .iter()
            .map(|validator| {
                let id = ids.next_id()?;
                let import = ImportBinding {
                    binding: format!("validate{id}"),
                    specifier: import_specifier(out_dir, &validator.module_path),
                };
                Ok(SchemaInstance {
                    validator,
                    id,
                    import,
                })
            })
            .collect()
    }

    /// Build the module IR. Batch order decides which validator owns a
    /// shared definition name.
    ///
    /// # Errors
    /// `DuplicateValidator` under [`DuplicatePolicy::Error`], or an id failure.
    pub fn aggregate(
        &self,
        validators: &[CompiledValidator],
        out_path: &Path,
    ) -> Result<(GeneratedModule, Vec<SkippedDuplicate>), CodegenError> {
        let instances = self.instances(validators, out_path)?;
        let mut module = GeneratedModule {
            header: vec![HEADER.to_string()],
            imports: instances.iter().map(|i| i.import.clone()).collect(),
            functions: Vec::new(),
        };
        let mut owners: HashMap<String, &SchemaInstance<'_>> = HashMap::new();
        let mut duplicates = Vec::new();

        for instance in &instances {
            for definition in &instance.validator.refs {
                if !instance.validator.is_exported(definition) {
                    continue;
                }
                let name = function_name(definition);
                if let Some(owner) = owners.get(&name) {
                    let duplicate = self.on_duplicate(&name, owner, instance, definition)?;
                    duplicates.push(duplicate);
                    continue;
                }
                owners.insert(name.clone(), instance);
                module.functions.push(PublicFunction {
                    name,
                    definition: definition.clone(),
                    validator: instance.import.binding.clone(),
                });
            }
        }
        Ok((module, duplicates))
    }

    fn on_duplicate(
        &self,
        name: &str,
        owner: &SchemaInstance<'_>,
        candidate: &SchemaInstance<'_>,
        definition: &str,
    ) -> Result<SkippedDuplicate, CodegenError> {
        let kept_from = owner.validator.schema_path.clone();
        let skipped_from = candidate.validator.schema_path.clone();
        if self.policy == DuplicatePolicy::Error {
            return Err(CodegenError::DuplicateValidator {
                name: name.to_string(),
                first: kept_from,
                second: skipped_from,
            });
        }
        let differs = owner.validator.document.definitions.get(definition)
            != candidate.validator.document.definitions.get(definition);
        if differs && self.policy == DuplicatePolicy::Warn {
            tracing::warn!(
                function = name,
                kept = %kept_from.display(),
                skipped = %skipped_from.display(),
                "conflicting definitions share a validator name, keeping the first"
            );
        }
        Ok(SkippedDuplicate {
            name: name.to_string(),
            kept_from,
            skipped_from,
            differs,
        })
    }

    /// Aggregate and overwrite the aggregated file.
    ///
    /// # Errors
    /// Aggregation errors, or `Core` when the file cannot be written.
    pub fn write(
        &self,
        validators: &[CompiledValidator],
        layout: &OutputLayout,
    ) -> Result<AggregateReport, CodegenError> {
        let path = layout.aggregated_path();
        let (module, duplicates) = self.aggregate(validators, &path)?;
        fs::ensure_dir(&layout.validation_dir())?;
        fs::write_file(&path, &TypeScriptPrinter.print(&module))?;
        tracing::debug!(
            path = %path.display(),
            imports = module.imports.len(),
            functions = module.functions.len(),
            "wrote aggregated module"
        );
        Ok(AggregateReport {
            path,
            imports: module.imports.len(),
            functions: module.functions.into_iter().map(|f| f.name).collect(),
            duplicates,
        })
    }
}

/// `./<relative dir>/<file stem>` of `module_path` seen from `out_dir`.
fn import_specifier(out_dir: &Path, module_path: &Path) -> String {
    let relative = relative_path(out_dir, &module_path.with_extension(""));
    if relative.starts_with("../") {
        relative
    } else {
        format!("./{relative}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn specifier_is_relative_without_extension() {
        assert_eq!(
            import_specifier(
                Path::new("/p/src/validationCode"),
                Path::new("/p/src/validationCode/user.validate.js")
            ),
            "./user.validate"
        );
        assert_eq!(
            import_specifier(
                Path::new("/p/src/generated"),
                Path::new("/p/src/validationCode/user.validate.js")
            ),
            "../validationCode/user.validate"
        );
    }
}
