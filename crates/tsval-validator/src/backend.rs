//! Schema → portable validator module.

use serde_json::Value;
use tsval_core::SchemaDocument;

use crate::emit::emit_module;
use crate::error::CompileError;
use crate::lower::lower_schema;
use crate::program::ValidatorProgram;

/// Output of a backend: module source plus the program it was rendered from.
#[derive(Debug, Clone)]
pub struct PortableModule {
    /// CommonJS source, before internal references are rewritten.
    pub code: String,
    pub program: ValidatorProgram,
}

/// Compiles schema documents into validator modules.
pub trait ValidatorBackend: Send + Sync {
    /// # Errors
    /// Any [`CompileError`]; the schema is then skipped by the caller.
    fn compile(&self, document: &SchemaDocument) -> Result<PortableModule, CompileError>;
}

/// Meta-checks the schema, lowers it to the rule IR and emits CommonJS.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandaloneBackend;

impl ValidatorBackend for StandaloneBackend {
    fn compile(&self, document: &SchemaDocument) -> Result<PortableModule, CompileError> {
        let mut schema = serde_json::to_value(document).map_err(CompileError::Serialize)?;
        drop_empty_any_of(&mut schema);
        normalize_merge_artifacts(&mut schema);
        meta_check(&schema)?;
        let program = lower_schema(&schema)?;
        Ok(PortableModule {
            code: emit_module(&program),
            program,
        })
    }
}

/// A module without root alternatives serializes `"anyOf": []`, which
/// draft-07 rejects (`minItems: 1`). Its root then accepts any value.
fn drop_empty_any_of(schema: &mut Value) {
    if let Some(root) = schema.as_object_mut()
        && root
            .get("anyOf")
            .and_then(Value::as_array)
            .is_some_and(Vec::is_empty)
    {
        root.remove("anyOf");
    }
}

/// Keywords whose arrays are sets; merging overlapping definitions can
/// repeat entries, which draft-07 rejects (`uniqueItems`).
const SET_KEYWORDS: &[&str] = &["required", "enum", "type"];

/// Keywords holding instance data rather than subschemas.
const VALUE_KEYWORDS: &[&str] = &["const", "enum", "default", "examples"];

/// Keywords mapping arbitrary names to subschemas.
const SCHEMA_MAPS: &[&str] = &["properties", "patternProperties", "definitions", "dependencies"];

/// Collapse repeated entries of set-valued keywords, keeping the first.
fn normalize_merge_artifacts(schema: &mut Value) {
    let Value::Object(map) = schema else {
        if let Value::Array(items) = schema {
            items.iter_mut().for_each(normalize_merge_artifacts);
        }
        return;
    };
    for (keyword, value) in map.iter_mut() {
        let keyword = keyword.as_str();
        if SET_KEYWORDS.contains(&keyword)
            && let Value::Array(items) = value
        {
            let before = items.len();
            dedup_in_order(items);
            if items.len() != before {
                tracing::debug!(keyword, removed = before - items.len(), "collapsed repeated entries");
            }
        }
        if VALUE_KEYWORDS.contains(&keyword) {
            continue;
        }
        match value {
            Value::Object(children) if SCHEMA_MAPS.contains(&keyword) => {
                children.values_mut().for_each(normalize_merge_artifacts);
            }
            other => normalize_merge_artifacts(other),
        }
    }
}

fn dedup_in_order(items: &mut Vec<Value>) {
    let mut kept: Vec<Value> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    *items = kept;
}

/// Check `schema` against the draft-07 meta-schema.
///
/// # Errors
/// `MetaSchema` with the first violation.
pub fn meta_check(schema: &Value) -> Result<(), CompileError> {
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .build(schema)
        .map(|_| ())
        .map_err(|e| CompileError::MetaSchema {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn rejects_non_draft7_shapes() {
        let err = meta_check(&json!({ "type": 12 })).expect_err("type must be a string or array");
        assert!(matches!(err, CompileError::MetaSchema { .. }));
    }

    #[test]
    fn accepts_custom_keywords() {
        assert!(meta_check(&json!({ "type": "object", "exported": ["A"] })).is_ok());
    }

    #[test]
    fn repeated_set_entries_are_collapsed() {
        let mut schema = json!({
            "definitions": {
                "User": {
                    "type": ["object", "object"],
                    "required": ["id", "name", "id"],
                    "properties": {
                        "role": { "enum": ["a", "b", "a"] },
                        "enum": { "type": ["string", "string"] },
                        "required": { "const": ["x", "x"] }
                    }
                }
            }
        });
        assert!(meta_check(&schema).is_err());

        normalize_merge_artifacts(&mut schema);
        assert_eq!(
            schema,
            json!({
                "definitions": {
                    "User": {
                        "type": ["object"],
                        "required": ["id", "name"],
                        "properties": {
                            "role": { "enum": ["a", "b"] },
                            "enum": { "type": ["string"] },
                            "required": { "const": ["x", "x"] }
                        }
                    }
                }
            })
        );
        assert!(meta_check(&schema).is_ok());
    }

    #[test]
    fn overlapping_documents_still_compile() {
        let user = json!({
            "type": "object",
            "properties": { "id": { "type": "number" } },
            "required": ["id"]
        });
        let first: SchemaDocument = serde_json::from_value(json!({
            "anyOf": [{ "$ref": "#/definitions/User" }],
            "definitions": { "User": user.clone() }
        }))
        .expect("document should parse");
        let mut with_name = user;
        with_name["required"] = json!(["id", "name"]);
        let second: SchemaDocument = serde_json::from_value(json!({
            "anyOf": [{ "$ref": "#/definitions/Account" }],
            "definitions": {
                "Account": { "$ref": "#/definitions/User" },
                "User": with_name
            }
        }))
        .expect("document should parse");

        let module = StandaloneBackend
            .compile(&SchemaDocument::combine([first, second]))
            .expect("merged document should compile");
        let program = &module.program;
        assert_eq!(
            program.validate_definition("User", &json!({ "id": 1, "name": "a" })),
            Some(vec![])
        );
        let errors = program
            .validate_definition("Account", &json!({ "id": 1 }))
            .expect("Account should have an entry point");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn empty_root_alternatives_are_dropped() {
        let document: SchemaDocument = serde_json::from_value(json!({
            "definitions": { "A": { "type": "string" } }
        }))
        .expect("document should parse");

        let module = StandaloneBackend
            .compile(&document)
            .expect("document should compile");
        assert!(module.program.is_valid(&json!(42)));
    }

    #[test]
    fn compiles_document() {
        let document: SchemaDocument = serde_json::from_value(json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "anyOf": [{ "$ref": "#/definitions/A" }],
            "definitions": { "A": { "type": "string" } }
        }))
        .expect("document should parse");

        let module = StandaloneBackend
            .compile(&document)
            .expect("document should compile");
        assert!(module.code.contains("module.exports = validate;"));
        assert!(module.program.is_valid(&json!("x")));
        assert!(!module.program.is_valid(&json!(1)));
    }
}
