//! Type introspection: named TypeScript types → raw schema documents.

use std::path::PathBuf;

use tsval_core::document::DRAFT_07;
use tsval_core::manifest::WILDCARD;
use tsval_core::{ObjectNode, SchemaDocument, SchemaRef};

use crate::error::IntrospectError;
use crate::format::{FormatOptions, SchemaFormatter, SubTypeFormatter};
use crate::graph::{Lookup, SourceGraph};
use crate::types::ReExport;

/// Settings for one introspection request.
#[derive(Debug, Clone)]
pub struct IntrospectConfig {
    /// Project config the types are compiled under.
    pub tsconfig: Option<PathBuf>,
    /// Module source file that declares (or re-exports) the type.
    pub path: PathBuf,
    /// When `false`, object schemas carry `additionalProperties: false`.
    pub additional_properties: bool,
    /// Percent-encode definition names inside `$ref` pointers.
    pub encode_refs: bool,
}

impl IntrospectConfig {
    #[must_use]
    pub const fn format_options(&self) -> FormatOptions {
        FormatOptions {
            additional_properties: self.additional_properties,
            encode_refs: self.encode_refs,
        }
    }
}

/// Schema for one requested type, before any merging.
#[derive(Debug, Clone, PartialEq)]
pub struct IntrospectedSchema {
    pub schema: String,
    /// Reference to the requested type's definition; `None` for the
    /// wildcard request.
    pub root_ref: Option<SchemaRef>,
    pub definitions: ObjectNode,
}

impl IntrospectedSchema {
    /// Document whose `anyOf` is the root reference, or every definition
    /// when there is no root.
    #[must_use]
    pub fn into_document(self, encode_refs: bool) -> SchemaDocument {
        let any_of = match self.root_ref {
            Some(root) => vec![root],
            None => self
                .definitions
                .keys()
                .map(|name| SchemaRef::to_definition(name, encode_refs))
                .collect(),
        };
        SchemaDocument {
            schema: Some(self.schema),
            any_of,
            definitions: self.definitions,
            ..SchemaDocument::default()
        }
    }
}

/// Produces structural schemas for named types.
pub trait TypeIntrospector: Send + Sync {
    /// Schema for `type_name` (or every exported type for `*`).
    ///
    /// # Errors
    /// Any [`IntrospectError`] raised while resolving the type graph.
    fn introspect(
        &self,
        type_name: &str,
        config: &IntrospectConfig,
    ) -> Result<IntrospectedSchema, IntrospectError>;

    /// Names of the module's exported, non-generic types in source order.
    ///
    /// # Errors
    /// Module loading errors.
    fn exported_types(&self, config: &IntrospectConfig) -> Result<Vec<String>, IntrospectError>;

    /// Add a formatter consulted before the built-in rules.
    fn register_formatter(&mut self, formatter: Box<dyn SubTypeFormatter>);
}

/// Introspector that reads type declarations straight from source.
#[derive(Default)]
pub struct SourceIntrospector {
    formatters: Vec<Box<dyn SubTypeFormatter>>,
}

impl SourceIntrospector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TypeIntrospector for SourceIntrospector {
    fn introspect(
        &self,
        type_name: &str,
        config: &IntrospectConfig,
    ) -> Result<IntrospectedSchema, IntrospectError> {
        tracing::debug!(
            type_name,
            path = %config.path.display(),
            tsconfig = ?config.tsconfig,
            "introspecting"
        );
        let graph = SourceGraph::new();
        let module = graph.load(&config.path)?;
        let mut formatter = SchemaFormatter::new(&graph, config.format_options(), &self.formatters);

        let root_ref = if type_name == WILDCARD {
            for name in self.exported_types(config)? {
                formatter.define_root(&module, &name)?;
            }
            None
        } else {
            let name = formatter.define_root(&module, type_name)?;
            Some(SchemaRef::to_definition(&name, config.encode_refs))
        };

        Ok(IntrospectedSchema {
            schema: DRAFT_07.to_string(),
            root_ref,
            definitions: formatter.into_definitions(),
        })
    }

    fn exported_types(&self, config: &IntrospectConfig) -> Result<Vec<String>, IntrospectError> {
        let graph = SourceGraph::new();
        let module = graph.load(&config.path)?;

        let mut names: Vec<String> = module.exported().map(|d| d.name.clone()).collect();
        names.extend(module.reexports.iter().filter_map(|r| match r {
            ReExport::Named { exported_as, .. } => Some(exported_as.clone()),
            ReExport::All { .. } => None,
        }));

        let mut concrete = Vec::with_capacity(names.len());
        for name in names {
            match graph.lookup(&module, &name)? {
                Lookup::Declaration(resolved) if SchemaFormatter::is_concrete(&resolved) => {
                    if !concrete.contains(&name) {
                        concrete.push(name);
                    }
                }
                _ => tracing::debug!(%name, "skipping generic or unresolved export"),
            }
        }
        Ok(concrete)
    }

    fn register_formatter(&mut self, formatter: Box<dyn SubTypeFormatter>) {
        self.formatters.push(formatter);
    }
}
