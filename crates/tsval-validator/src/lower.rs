//! Schema JSON → [`ValidatorProgram`].

use std::collections::HashMap;

use regex::Regex;
use serde_json::{Map, Number, Value};
use tsval_core::document::{DEFINITIONS_POINTER, definition_name_from_pointer};

use crate::error::CompileError;
use crate::program::{
    Additional, Bound, CompiledSchema, CountKind, JsonType, Pattern, Rule, SchemaId,
    ValidatorProgram,
};

/// Keywords that carry no validation semantics.
const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "definitions",
    "description",
    "title",
    "default",
    "examples",
    "format",
    "readOnly",
    "writeOnly",
    "exported",
];

/// Keywords read together with a sibling rather than on their own.
const PAIRED_KEYWORDS: &[&str] = &["additionalProperties", "additionalItems"];

/// Compile a schema document rooted at `schema`.
///
/// `$ref`s resolve against the root's `definitions`; each target is
/// compiled once. Every definition also becomes an entry point of the
/// program, whether or not the root refers to it.
///
/// # Errors
/// `UnresolvedRef`, `InvalidKeyword` or `InvalidPattern`.
pub fn lower_schema(schema: &Value) -> Result<ValidatorProgram, CompileError> {
    let mut lowerer = Lowerer {
        root: schema,
        schemas: Vec::new(),
        refs: HashMap::new(),
        by_name: HashMap::new(),
    };
    let root = lowerer.alloc();
    lowerer.refs.insert("#".to_string(), root);
    lowerer.lower_into(root, schema, "#")?;

    let mut definitions = Vec::new();
    if let Some(map) = schema.get("definitions").and_then(Value::as_object) {
        for (name, target) in map {
            let id = lowerer.define(name, target)?;
            definitions.push((name.clone(), id));
        }
    }

    Ok(ValidatorProgram {
        root,
        schemas: lowerer.schemas,
        definitions,
    })
}

struct Lowerer<'a> {
    root: &'a Value,
    schemas: Vec<CompiledSchema>,
    /// Pointer text as written → compiled schema.
    refs: HashMap<String, SchemaId>,
    /// Decoded definition name → compiled schema.
    by_name: HashMap<String, SchemaId>,
}

impl<'a> Lowerer<'a> {
    fn alloc(&mut self) -> SchemaId {
        self.schemas.push(CompiledSchema::Bool {
            schema_path: String::new(),
            value: true,
        });
        SchemaId(self.schemas.len() - 1)
    }

    fn lower(&mut self, value: &'a Value, path: &str) -> Result<SchemaId, CompileError> {
        let id = self.alloc();
        self.lower_into(id, value, path)?;
        Ok(id)
    }

    fn lower_into(&mut self, id: SchemaId, value: &'a Value, path: &str) -> Result<(), CompileError> {
        let compiled = match value {
            Value::Bool(value) => CompiledSchema::Bool {
                schema_path: path.to_string(),
                value: *value,
            },
            Value::Object(map) => CompiledSchema::Rules {
                schema_path: path.to_string(),
                rules: self.rules(map, path)?,
            },
            other => return Err(invalid("schema", path, format!("expected an object or boolean, found {other}"))),
        };
        self.schemas[id.0] = compiled;
        Ok(())
    }

    fn resolve_ref(&mut self, pointer: &str) -> Result<SchemaId, CompileError> {
        if let Some(id) = self.refs.get(pointer) {
            return Ok(*id);
        }
        let unresolved = || CompileError::UnresolvedRef {
            pointer: pointer.to_string(),
        };
        let name = definition_name_from_pointer(pointer).ok_or_else(unresolved)?;
        if let Some(id) = self.by_name.get(&name).copied() {
            self.refs.insert(pointer.to_string(), id);
            return Ok(id);
        }
        let root = self.root;
        let target = root
            .get("definitions")
            .and_then(|definitions| definitions.get(name.as_str()))
            .ok_or_else(unresolved)?;
        let id = self.alloc();
        self.refs.insert(pointer.to_string(), id);
        self.by_name.insert(name, id);
        self.lower_into(id, target, pointer)?;
        Ok(id)
    }

    /// Entry point for a definition, reusing the `$ref` compilation when
    /// the root already reached it.
    fn define(&mut self, name: &str, target: &'a Value) -> Result<SchemaId, CompileError> {
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }
        let pointer = format!("{DEFINITIONS_POINTER}{}", escape_pointer(name));
        let id = self.alloc();
        self.by_name.insert(name.to_string(), id);
        self.lower_into(id, target, &pointer)?;
        Ok(id)
    }

    fn rules(&mut self, map: &'a Map<String, Value>, path: &str) -> Result<Vec<Rule>, CompileError> {
        // Draft-07: siblings of `$ref` are ignored.
        if let Some(reference) = map.get("$ref") {
            let pointer = reference
                .as_str()
                .ok_or_else(|| invalid("$ref", path, "expected a string"))?;
            return Ok(vec![Rule::Ref(self.resolve_ref(pointer)?)]);
        }

        let mut rules = Vec::new();
        for (keyword, value) in map {
            let at = format!("{path}/{keyword}");
            let rule = match keyword.as_str() {
                "type" => Rule::Type(parse_types(value, &at)?),
                "enum" => Rule::Enum(
                    value
                        .as_array()
                        .filter(|values| !values.is_empty())
                        .ok_or_else(|| invalid(keyword, &at, "expected a non-empty array"))?
                        .clone(),
                ),
                "const" => Rule::Const(value.clone()),
                "properties" => {
                    let properties = value
                        .as_object()
                        .ok_or_else(|| invalid(keyword, &at, "expected an object"))?;
                    let mut compiled = Vec::with_capacity(properties.len());
                    for (name, schema) in properties {
                        let id = self.lower(schema, &format!("{at}/{}", escape_pointer(name)))?;
                        compiled.push((name.clone(), id));
                    }
                    Rule::Properties(compiled)
                }
                "required" => Rule::Required(
                    value
                        .as_array()
                        .and_then(|names| {
                            names
                                .iter()
                                .map(|n| n.as_str().map(str::to_string))
                                .collect::<Option<Vec<_>>>()
                        })
                        .ok_or_else(|| invalid(keyword, &at, "expected an array of strings"))?,
                ),
                "items" => match value {
                    Value::Array(items) => {
                        let mut compiled = Vec::with_capacity(items.len());
                        for (i, item) in items.iter().enumerate() {
                            compiled.push(self.lower(item, &format!("{at}/{i}"))?);
                        }
                        let additional = match map.get("additionalItems") {
                            Some(extra) => self.additional(extra, &format!("{path}/additionalItems"))?,
                            None => None,
                        };
                        Rule::TupleItems {
                            items: compiled,
                            additional,
                        }
                    }
                    other => Rule::Items(self.lower(other, &at)?),
                },
                "uniqueItems" => match value.as_bool() {
                    Some(true) => Rule::UniqueItems,
                    Some(false) => continue,
                    None => return Err(invalid(keyword, &at, "expected a boolean")),
                },
                "minItems" => count(CountKind::MinItems, value, &at)?,
                "maxItems" => count(CountKind::MaxItems, value, &at)?,
                "minLength" => count(CountKind::MinLength, value, &at)?,
                "maxLength" => count(CountKind::MaxLength, value, &at)?,
                "pattern" => {
                    let source = value
                        .as_str()
                        .ok_or_else(|| invalid(keyword, &at, "expected a string"))?;
                    let regex = Regex::new(source).map_err(|e| CompileError::InvalidPattern {
                        pattern: source.to_string(),
                        source: e,
                    })?;
                    Rule::Pattern(Pattern {
                        source: source.to_string(),
                        regex,
                    })
                }
                "minimum" => bound(Bound::Minimum, value, &at)?,
                "maximum" => bound(Bound::Maximum, value, &at)?,
                "exclusiveMinimum" => bound(Bound::ExclusiveMinimum, value, &at)?,
                "exclusiveMaximum" => bound(Bound::ExclusiveMaximum, value, &at)?,
                "multipleOf" => Rule::MultipleOf(
                    number(value)
                        .filter(|n| n.as_f64().is_some_and(|f| f > 0.0))
                        .ok_or_else(|| invalid(keyword, &at, "expected a number > 0"))?,
                ),
                "anyOf" => Rule::AnyOf(self.schema_list(value, &at)?),
                "allOf" => Rule::AllOf(self.schema_list(value, &at)?),
                "oneOf" => Rule::OneOf(self.schema_list(value, &at)?),
                "not" => Rule::Not(self.lower(value, &at)?),
                k if ANNOTATION_KEYWORDS.contains(&k) || PAIRED_KEYWORDS.contains(&k) => continue,
                unknown => {
                    tracing::warn!(keyword = unknown, schema_path = %at, "unknown keyword ignored");
                    continue;
                }
            };
            rules.push(rule);
        }

        if let Some(extra) = map.get("additionalProperties")
            && let Some(policy) = self.additional(extra, &format!("{path}/additionalProperties"))?
        {
            let known = map
                .get("properties")
                .and_then(Value::as_object)
                .map(|p| p.keys().cloned().collect())
                .unwrap_or_default();
            rules.push(Rule::AdditionalProperties { known, policy });
        }

        Ok(rules)
    }

    /// `None` for `true` (no constraint).
    fn additional(&mut self, value: &'a Value, path: &str) -> Result<Option<Additional>, CompileError> {
        Ok(match value {
            Value::Bool(true) => None,
            Value::Bool(false) => Some(Additional::Forbidden),
            other => Some(Additional::Schema(self.lower(other, path)?)),
        })
    }

    fn schema_list(&mut self, value: &'a Value, path: &str) -> Result<Vec<SchemaId>, CompileError> {
        let items = value
            .as_array()
            .filter(|items| !items.is_empty())
            .ok_or_else(|| invalid("schema list", path, "expected a non-empty array"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.lower(item, &format!("{path}/{i}")))
            .collect()
    }
}

fn invalid(keyword: &str, schema_path: &str, reason: impl Into<String>) -> CompileError {
    CompileError::InvalidKeyword {
        keyword: keyword.to_string(),
        schema_path: schema_path.to_string(),
        reason: reason.into(),
    }
}

fn parse_types(value: &Value, path: &str) -> Result<Vec<JsonType>, CompileError> {
    let parse = |v: &Value| {
        v.as_str()
            .and_then(JsonType::parse)
            .ok_or_else(|| invalid("type", path, format!("unknown type {v}")))
    };
    match value {
        Value::Array(types) => types.iter().map(parse).collect(),
        single => Ok(vec![parse(single)?]),
    }
}

fn number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        _ => None,
    }
}

fn count(kind: CountKind, value: &Value, path: &str) -> Result<Rule, CompileError> {
    let limit = value
        .as_u64()
        .ok_or_else(|| invalid(kind.keyword(), path, "expected a non-negative integer"))?;
    Ok(Rule::Count { kind, limit })
}

fn bound(bound: Bound, value: &Value, path: &str) -> Result<Rule, CompileError> {
    let limit = number(value).ok_or_else(|| invalid(bound.keyword(), path, "expected a number"))?;
    Ok(Rule::Bound { bound, limit })
}

/// RFC 6901 escaping of one pointer segment.
#[must_use]
pub fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
