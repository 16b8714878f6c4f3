//! Manifest entry → combined, persisted schema document.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tsval_config::SchemaConfig;
use tsval_core::{ManifestEntry, OutputLayout, SchemaDocument, TypeSelection, fs};
use tsval_parser::graph::resolve_module_path;
use tsval_parser::{IntrospectConfig, SourceIntrospector, TypeIntrospector};

use crate::error::SchemaError;
use crate::formatter::FunctionTypeFormatter;

/// Outcome of building one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltSchema {
    /// Module specifier from the manifest.
    pub module: String,
    /// Resolved module source file.
    pub source: PathBuf,
    /// Persisted schema document.
    pub schema_path: PathBuf,
    /// Definition names in document order.
    pub definitions: Vec<String>,
}

pub struct SchemaBuilder {
    introspector: Box<dyn TypeIntrospector>,
    options: SchemaConfig,
    tsconfig: Option<PathBuf>,
}

impl SchemaBuilder {
    /// Wrap an introspector; the callable-member override is registered
    /// here so every schema the builder produces carries it.
    #[must_use]
    pub fn new(
        mut introspector: Box<dyn TypeIntrospector>,
        options: SchemaConfig,
        tsconfig: Option<PathBuf>,
    ) -> Self {
        introspector.register_formatter(Box::new(FunctionTypeFormatter));
        Self {
            introspector,
            options,
            tsconfig,
        }
    }

    /// Builder backed by the source-reading introspector.
    #[must_use]
    pub fn with_source_introspector(options: SchemaConfig, tsconfig: Option<PathBuf>) -> Self {
        Self::new(Box::new(SourceIntrospector::new()), options, tsconfig)
    }

    #[must_use]
    pub const fn options(&self) -> &SchemaConfig {
        &self.options
    }

    /// Module source file for a manifest specifier.
    ///
    /// # Errors
    /// `ModuleNotFound` when no candidate file exists.
    pub fn resolve_module(manifest_dir: &Path, module: &str) -> Result<PathBuf, SchemaError> {
        resolve_module_path(manifest_dir, module).ok_or_else(|| SchemaError::ModuleNotFound {
            module: module.to_string(),
            dir: manifest_dir.to_path_buf(),
        })
    }

    fn introspect_config(&self, source: &Path) -> IntrospectConfig {
        IntrospectConfig {
            tsconfig: self.tsconfig.clone(),
            path: source.to_path_buf(),
            additional_properties: self.options.additional_properties,
            encode_refs: self.options.encode_refs,
        }
    }

    /// Document for one type: `anyOf` is the type's root reference, or every
    /// definition when the introspector reports no root.
    ///
    /// # Errors
    /// `Introspect` wrapping the resolution failure.
    pub fn format_type(&self, type_name: &str, source: &Path) -> Result<SchemaDocument, SchemaError> {
        let schema = self
            .introspector
            .introspect(type_name, &self.introspect_config(source))
            .map_err(|source| SchemaError::Introspect {
                type_name: type_name.to_string(),
                source,
            })?;
        Ok(schema.into_document(self.options.encode_refs))
    }

    /// Combined document for every type the entry requests.
    ///
    /// # Errors
    /// The first per-type failure; the module is abandoned.
    pub fn build_module(&self, source: &Path, selection: &TypeSelection) -> Result<SchemaDocument, SchemaError> {
        let names = match selection {
            TypeSelection::Named(names) => names.clone(),
            TypeSelection::All => self
                .introspector
                .exported_types(&self.introspect_config(source))
                .map_err(|e| SchemaError::Introspect {
                    type_name: tsval_core::manifest::WILDCARD.to_string(),
                    source: e,
                })?,
        };
        let restrict = self.options.restrict_to_requested && !selection.is_all();

        let mut documents = Vec::with_capacity(names.len());
        for name in &names {
            let mut document = self.format_type(name, source)?;
            if restrict {
                document.exported = Some(vec![name.clone()]);
            }
            documents.push(document);
        }

        let combined = SchemaDocument::combine(documents);
        let dangling = combined.dangling_refs();
        if !dangling.is_empty() {
            tracing::warn!(source = %source.display(), ?dangling, "schema has unresolved anyOf refs");
        }
        Ok(combined)
    }

    /// Write `document` as the schema file for `source`, replacing any
    /// previous file.
    ///
    /// # Errors
    /// `Serialization` or `Core` (file system) failures.
    pub fn persist(
        document: &SchemaDocument,
        source: &Path,
        layout: &OutputLayout,
    ) -> Result<PathBuf, SchemaError> {
        let path = layout.schema_path_for_module(source)?;
        let json = document
            .to_pretty_json()
            .map_err(|e| SchemaError::Serialization {
                path: path.clone(),
                source: e,
            })?;

        fs::ensure_dir(&layout.schemas_dir())?;
        if fs::remove_stale(&path)? {
            tracing::debug!(path = %path.display(), "removed previous schema");
        }
        fs::write_file(&path, &json)?;
        Ok(path)
    }

    /// Resolve, build and persist one manifest entry.
    ///
    /// # Errors
    /// Any failure of the three steps.
    pub fn build(
        &self,
        entry: &ManifestEntry,
        manifest_dir: &Path,
        layout: &OutputLayout,
    ) -> Result<BuiltSchema, SchemaError> {
        let source = Self::resolve_module(manifest_dir, &entry.module)?;
        let document = self.build_module(&source, &entry.selection)?;
        let schema_path = Self::persist(&document, &source, layout)?;
        tracing::info!(
            module = %entry.module,
            path = %schema_path.display(),
            definitions = document.definitions.len(),
            "schema written"
        );
        Ok(BuiltSchema {
            module: entry.module.clone(),
            source,
            schema_path,
            definitions: document.definition_names(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs as stdfs;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;
    use tsval_core::{ObjectNode, SchemaNode, SchemaRef};
    use tsval_parser::{IntrospectError, IntrospectedSchema, SubTypeFormatter};

    use super::*;

    /// Introspector returning canned definitions per type name.
    #[derive(Default)]
    struct Canned;

    impl TypeIntrospector for Canned {
        fn introspect(
            &self,
            type_name: &str,
            _config: &IntrospectConfig,
        ) -> Result<IntrospectedSchema, IntrospectError> {
            let definitions: ObjectNode = match type_name {
                "A" => serde_json::from_value(json!({
                    "A": { "type": "object", "required": ["a"] },
                    "Shared": { "type": "object", "required": ["x"] }
                })),
                "B" => serde_json::from_value(json!({
                    "B": { "type": "string" },
                    "Shared": { "type": "object", "required": ["y"] }
                })),
                _ => {
                    return Err(IntrospectError::TypeNotFound {
                        name: type_name.to_string(),
                        module: PathBuf::from("mod.ts"),
                    });
                }
            }
            .expect("canned definitions should parse");
            Ok(IntrospectedSchema {
                schema: tsval_core::document::DRAFT_07.to_string(),
                root_ref: Some(SchemaRef::to_definition(type_name, true)),
                definitions,
            })
        }

        fn exported_types(&self, _config: &IntrospectConfig) -> Result<Vec<String>, IntrospectError> {
            Ok(vec!["A".into(), "B".into()])
        }

        fn register_formatter(&mut self, _formatter: Box<dyn SubTypeFormatter>) {}
    }

    fn builder(options: SchemaConfig) -> SchemaBuilder {
        SchemaBuilder::new(Box::<Canned>::default(), options, None)
    }

    #[test]
    fn per_type_documents_merge_in_order() {
        let document = builder(SchemaConfig::default())
            .build_module(Path::new("mod.ts"), &TypeSelection::Named(vec!["A".into(), "B".into()]))
            .expect("module should build");

        assert_eq!(
            document.any_of,
            vec![SchemaRef::to_definition("A", true), SchemaRef::to_definition("B", true)]
        );
        assert_eq!(document.definition_names(), vec!["A", "Shared", "B"]);
        assert_eq!(
            document.definitions.get("Shared").map(SchemaNode::to_value),
            Some(json!({ "type": "object", "required": ["x", "y"] }))
        );
        assert_eq!(document.exported, None);
    }

    #[test]
    fn wildcard_uses_exported_types() {
        let document = builder(SchemaConfig::default())
            .build_module(Path::new("mod.ts"), &TypeSelection::All)
            .expect("module should build");
        assert_eq!(document.any_of.len(), 2);
    }

    #[test]
    fn restrict_to_requested_writes_allow_list() {
        let options = SchemaConfig {
            restrict_to_requested: true,
            ..SchemaConfig::default()
        };
        let document = builder(options)
            .build_module(Path::new("mod.ts"), &TypeSelection::Named(vec!["A".into(), "B".into()]))
            .expect("module should build");
        assert_eq!(document.exported, Some(vec!["A".to_string(), "B".to_string()]));
    }

    #[test]
    fn missing_type_fails_the_module() {
        let err = builder(SchemaConfig::default())
            .build_module(Path::new("mod.ts"), &TypeSelection::Named(vec!["A".into(), "Nope".into()]))
            .expect_err("Nope is unknown");
        assert!(matches!(err, SchemaError::Introspect { ref type_name, .. } if type_name == "Nope"));
    }

    #[test]
    fn persist_replaces_previous_file() {
        let tmp = TempDir::new().expect("tempdir should create");
        let layout = OutputLayout::new(tmp.path().join("src"), tmp.path().join("out"));
        let schemas = layout.schemas_dir();
        stdfs::create_dir_all(&schemas).expect("mkdir should succeed");
        stdfs::write(schemas.join("user.schema.json"), "stale").expect("write should succeed");

        let document = SchemaDocument {
            schema: Some(tsval_core::document::DRAFT_07.to_string()),
            ..SchemaDocument::default()
        };
        let path = SchemaBuilder::persist(&document, Path::new("/src/models/user.ts"), &layout)
            .expect("persist should succeed");

        assert_eq!(path, schemas.join("user.schema.json"));
        let written = stdfs::read_to_string(&path).expect("schema should exist");
        assert!(written.starts_with("{\n  \"$schema\""));
        assert_eq!(
            SchemaDocument::from_json(&written).expect("written schema should parse"),
            document
        );
    }

    #[test]
    fn unresolvable_module() {
        let tmp = TempDir::new().expect("tempdir should create");
        let err = SchemaBuilder::resolve_module(tmp.path(), "./missing").expect_err("no such module");
        assert!(matches!(err, SchemaError::ModuleNotFound { .. }));
    }
}
