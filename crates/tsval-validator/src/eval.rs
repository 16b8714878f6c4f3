//! In-process interpretation of a [`ValidatorProgram`].
//!
//! Semantics match the emitted JavaScript: every applicable rule runs and
//! all failures are collected.

use serde_json::{Value, json};

use crate::lower::escape_pointer;
use crate::program::{
    Additional, CompiledSchema, JsonType, Rule, SchemaId, ValidationError,
    ValidatorProgram,
};

impl ValidatorProgram {
    /// All failures of `data` against the root schema; empty when valid.
    #[must_use]
    pub fn validate(&self, data: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.check(self.root, data, "", &mut errors);
        errors
    }

    /// Failures of `data` against one definition's entry point, or `None`
    /// when the program has no definition called `name`.
    #[must_use]
    pub fn validate_definition(&self, name: &str, data: &Value) -> Option<Vec<ValidationError>> {
        let id = self.definition(name)?;
        let mut errors = Vec::new();
        self.check(id, data, "", &mut errors);
        Some(errors)
    }

    #[must_use]
    pub fn is_valid(&self, data: &Value) -> bool {
        self.validate(data).is_empty()
    }

    fn check(&self, id: SchemaId, data: &Value, at: &str, errors: &mut Vec<ValidationError>) {
        match self.schema(id) {
            CompiledSchema::Bool { value: true, .. } => {}
            CompiledSchema::Bool {
                value: false,
                schema_path,
            } => errors.push(ValidationError {
                instance_path: at.to_string(),
                schema_path: schema_path.clone(),
                keyword: "false schema".into(),
                params: json!({}),
                message: "boolean schema is false".into(),
            }),
            CompiledSchema::Rules { schema_path, rules } => {
                for rule in rules {
                    self.check_rule(rule, schema_path, data, at, errors);
                }
            }
        }
    }

    fn passes(&self, id: SchemaId, data: &Value, at: &str) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        self.check(id, data, at, &mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    #[allow(clippy::too_many_lines)]
    fn check_rule(
        &self,
        rule: &Rule,
        schema_path: &str,
        data: &Value,
        at: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        let fail = |keyword: &str, params: Value, message: String| ValidationError {
            instance_path: at.to_string(),
            schema_path: format!("{schema_path}/{keyword}"),
            keyword: keyword.to_string(),
            params,
            message,
        };

        match rule {
            Rule::Ref(target) => self.check(*target, data, at, errors),
            Rule::Type(types) => {
                if !types.iter().any(|t| matches_type(*t, data)) {
                    let names = types.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(",");
                    errors.push(fail("type", json!({ "type": names }), format!("must be {names}")));
                }
            }
            Rule::Enum(values) => {
                if !values.iter().any(|v| json_equal(v, data)) {
                    errors.push(fail(
                        "enum",
                        json!({ "allowedValues": values }),
                        "must be equal to one of the allowed values".into(),
                    ));
                }
            }
            Rule::Const(expected) => {
                if !json_equal(expected, data) {
                    errors.push(fail(
                        "const",
                        json!({ "allowedValue": expected }),
                        "must be equal to constant".into(),
                    ));
                }
            }
            Rule::Properties(properties) => {
                if let Value::Object(object) = data {
                    for (name, id) in properties {
                        if let Some(value) = object.get(name) {
                            let path = format!("{at}/{}", escape_pointer(name));
                            self.check(*id, value, &path, errors);
                        }
                    }
                }
            }
            Rule::Required(names) => {
                if let Value::Object(object) = data {
                    for name in names.iter().filter(|n| !object.contains_key(n.as_str())) {
                        errors.push(fail(
                            "required",
                            json!({ "missingProperty": name }),
                            format!("must have required property '{name}'"),
                        ));
                    }
                }
            }
            Rule::AdditionalProperties { known, policy } => {
                if let Value::Object(object) = data {
                    for (key, value) in object.iter().filter(|(k, _)| !known.contains(k)) {
                        match policy {
                            Additional::Forbidden => errors.push(fail(
                                "additionalProperties",
                                json!({ "additionalProperty": key }),
                                "must NOT have additional properties".into(),
                            )),
                            Additional::Schema(id) => {
                                let path = format!("{at}/{}", escape_pointer(key));
                                self.check(*id, value, &path, errors);
                            }
                        }
                    }
                }
            }
            Rule::Items(id) => {
                if let Value::Array(items) = data {
                    for (i, item) in items.iter().enumerate() {
                        self.check(*id, item, &format!("{at}/{i}"), errors);
                    }
                }
            }
            Rule::TupleItems { items, additional } => {
                if let Value::Array(values) = data {
                    for (i, (id, value)) in items.iter().zip(values).enumerate() {
                        self.check(*id, value, &format!("{at}/{i}"), errors);
                    }
                    if values.len() > items.len() {
                        match additional {
                            Some(Additional::Forbidden) => errors.push(fail(
                                "additionalItems",
                                json!({ "limit": items.len() }),
                                format!("must NOT have more than {} items", items.len()),
                            )),
                            Some(Additional::Schema(id)) => {
                                for (i, value) in values.iter().enumerate().skip(items.len()) {
                                    self.check(*id, value, &format!("{at}/{i}"), errors);
                                }
                            }
                            None => {}
                        }
                    }
                }
            }
            Rule::UniqueItems => {
                if let Value::Array(values) = data
                    && let Some((i, j)) = first_duplicate(values)
                {
                    errors.push(fail(
                        "uniqueItems",
                        json!({ "i": i, "j": j }),
                        format!("must NOT have duplicate items (items ## {j} and {i} are identical)"),
                    ));
                }
            }
            Rule::Count { kind, limit } => {
                let length = match (kind.applies_to_strings(), data) {
                    (true, Value::String(s)) => s.chars().count(),
                    (false, Value::Array(items)) => items.len(),
                    _ => return,
                };
                let length = u64::try_from(length).unwrap_or(u64::MAX);
                let violated = if kind.is_min() { length < *limit } else { length > *limit };
                if violated {
                    let relation = if kind.is_min() { "fewer" } else { "more" };
                    errors.push(fail(
                        kind.keyword(),
                        json!({ "limit": limit }),
                        format!("must NOT have {relation} than {limit} {}", kind.unit()),
                    ));
                }
            }
            Rule::Pattern(pattern) => {
                if let Value::String(s) = data
                    && !pattern.regex.is_match(s)
                {
                    errors.push(fail(
                        "pattern",
                        json!({ "pattern": pattern.source }),
                        format!("must match pattern \"{}\"", pattern.source),
                    ));
                }
            }
            Rule::Bound { bound, limit } => {
                if let (Some(value), Some(limit_f)) = (data.as_f64(), limit.as_f64())
                    && !bound.holds(value, limit_f)
                {
                    errors.push(fail(
                        bound.keyword(),
                        json!({ "comparison": bound.comparison(), "limit": limit }),
                        format!("must be {} {limit}", bound.comparison()),
                    ));
                }
            }
            Rule::MultipleOf(divisor) => {
                if let (Some(value), Some(d)) = (data.as_f64(), divisor.as_f64())
                    && value % d != 0.0
                {
                    errors.push(fail(
                        "multipleOf",
                        json!({ "multipleOf": divisor }),
                        format!("must be multiple of {divisor}"),
                    ));
                }
            }
            Rule::AnyOf(branches) => {
                let mut branch_errors = Vec::new();
                for id in branches {
                    match self.passes(*id, data, at) {
                        Ok(()) => return,
                        Err(errs) => branch_errors.extend(errs),
                    }
                }
                errors.extend(branch_errors);
                errors.push(fail("anyOf", json!({}), "must match a schema in anyOf".into()));
            }
            Rule::AllOf(parts) => {
                for id in parts {
                    self.check(*id, data, at, errors);
                }
            }
            Rule::OneOf(branches) => {
                let mut passing = Vec::new();
                let mut branch_errors = Vec::new();
                for (i, id) in branches.iter().enumerate() {
                    match self.passes(*id, data, at) {
                        Ok(()) => passing.push(i),
                        Err(errs) => branch_errors.extend(errs),
                    }
                    if passing.len() > 1 {
                        break;
                    }
                }
                if passing.len() != 1 {
                    let passing_schemas = if passing.is_empty() {
                        errors.extend(branch_errors);
                        Value::Null
                    } else {
                        json!(passing)
                    };
                    errors.push(fail(
                        "oneOf",
                        json!({ "passingSchemas": passing_schemas }),
                        "must match exactly one schema in oneOf".into(),
                    ));
                }
            }
            Rule::Not(id) => {
                if self.passes(*id, data, at).is_ok() {
                    errors.push(fail("not", json!({}), "must NOT be valid".into()));
                }
            }
        }
    }
}

fn matches_type(ty: JsonType, data: &Value) -> bool {
    match ty {
        JsonType::Null => data.is_null(),
        JsonType::Boolean => data.is_boolean(),
        JsonType::Object => data.is_object(),
        JsonType::Array => data.is_array(),
        JsonType::Number => data.is_number(),
        JsonType::String => data.is_string(),
        JsonType::Integer => match data {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
    }
}

/// Structural equality with numbers compared by value (`1 == 1.0`).
#[must_use]
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Highest index `i` that repeats an earlier item, with the latest such `j`.
fn first_duplicate(values: &[Value]) -> Option<(usize, usize)> {
    (0..values.len())
        .rev()
        .find_map(|i| (0..i).rev().find(|&j| json_equal(&values[i], &values[j])).map(|j| (i, j)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use crate::lower::lower_schema;

    use super::*;

    fn program(schema: &Value) -> ValidatorProgram {
        lower_schema(schema).expect("schema should lower")
    }

    fn user_schema() -> Value {
        json!({
            "anyOf": [{ "$ref": "#/definitions/User" }],
            "definitions": {
                "User": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "number" },
                        "name": { "type": "string" }
                    },
                    "required": ["id", "name"]
                }
            }
        })
    }

    fn entity_and_user_schema() -> Value {
        json!({
            "anyOf": [
                { "$ref": "#/definitions/Entity" },
                { "$ref": "#/definitions/User" }
            ],
            "definitions": {
                "Entity": {
                    "type": "object",
                    "properties": { "id": { "type": "number" } },
                    "required": ["id"]
                },
                "User": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "number" },
                        "name": { "type": "string" }
                    },
                    "required": ["id", "name"]
                }
            }
        })
    }

    #[test]
    fn definition_entry_rejects_value_matching_only_a_sibling() {
        let program = program(&entity_and_user_schema());
        let entity_only = json!({ "id": 1 });

        assert!(program.is_valid(&entity_only));
        let errors = program
            .validate_definition("User", &entity_only)
            .expect("User should have an entry point");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword, "required");
        assert_eq!(errors[0].schema_path, "#/definitions/User/required");
    }

    #[test]
    fn definition_entry_accepts_its_own_shape() {
        let program = program(&entity_and_user_schema());
        assert_eq!(
            program.validate_definition("Entity", &json!({ "id": 2 })),
            Some(vec![])
        );
        assert_eq!(program.validate_definition("Account", &json!({})), None);
    }

    #[test]
    fn matching_value_has_no_errors() {
        assert_eq!(
            program(&user_schema()).validate(&json!({ "id": 1, "name": "a" })),
            vec![]
        );
    }

    #[test]
    fn wrong_type_and_missing_property() {
        let errors = program(&user_schema()).validate(&json!({ "id": "x" }));
        assert_eq!(
            errors,
            vec![
                ValidationError {
                    instance_path: "/id".into(),
                    schema_path: "#/definitions/User/properties/id/type".into(),
                    keyword: "type".into(),
                    params: json!({ "type": "number" }),
                    message: "must be number".into(),
                },
                ValidationError {
                    instance_path: String::new(),
                    schema_path: "#/definitions/User/required".into(),
                    keyword: "required".into(),
                    params: json!({ "missingProperty": "name" }),
                    message: "must have required property 'name'".into(),
                },
                ValidationError {
                    instance_path: String::new(),
                    schema_path: "#/anyOf".into(),
                    keyword: "anyOf".into(),
                    params: json!({}),
                    message: "must match a schema in anyOf".into(),
                },
            ]
        );
    }

    #[rstest]
    #[case(json!({ "type": "integer" }), json!(3), true)]
    #[case(json!({ "type": "integer" }), json!(3.5), false)]
    #[case(json!({ "type": ["string", "null"] }), json!(null), true)]
    #[case(json!({ "enum": [1, "a"] }), json!(1.0), true)]
    #[case(json!({ "const": { "a": [1] } }), json!({ "a": [1] }), true)]
    #[case(json!({ "minLength": 2 }), json!("é"), false)]
    #[case(json!({ "maxLength": 1 }), json!("😀"), true)]
    #[case(json!({ "minLength": 5 }), json!(12), true)]
    #[case(json!({ "pattern": "^[a-z]+$" }), json!("abc"), true)]
    #[case(json!({ "pattern": "^[a-z]+$" }), json!("ab1"), false)]
    #[case(json!({ "minimum": 0 }), json!(-1), false)]
    #[case(json!({ "exclusiveMaximum": 10 }), json!(10), false)]
    #[case(json!({ "multipleOf": 3 }), json!(9), true)]
    #[case(json!({ "multipleOf": 3 }), json!(10), false)]
    #[case(json!({ "uniqueItems": true }), json!([1, 2, 1]), false)]
    #[case(json!({ "items": [{ "type": "number" }], "additionalItems": false }), json!([1, 2]), false)]
    #[case(json!({ "items": [{ "type": "number" }], "minItems": 1, "maxItems": 1 }), json!([1]), true)]
    #[case(json!({ "oneOf": [{ "type": "number" }, { "minimum": 0 }] }), json!(5), false)]
    #[case(json!({ "oneOf": [{ "type": "number" }, { "type": "string" }] }), json!(5), true)]
    #[case(json!({ "not": { "type": "string" } }), json!(1), true)]
    #[case(json!({ "allOf": [{ "minimum": 1 }, { "maximum": 2 }] }), json!(3), false)]
    #[case(json!(false), json!(1), false)]
    #[case(json!({ "additionalProperties": { "type": "number" } }), json!({ "a": 1 }), true)]
    #[case(json!({ "additionalProperties": { "type": "number" } }), json!({ "a": "x" }), false)]
    fn keyword_semantics(#[case] schema: Value, #[case] data: Value, #[case] valid: bool) {
        assert_eq!(program(&schema).is_valid(&data), valid, "{schema} vs {data}");
    }

    #[test]
    fn duplicate_indices_match_reported_pair() {
        let errors = program(&json!({ "uniqueItems": true })).validate(&json!(["a", "b", "a", "b"]));
        assert_eq!(errors[0].params, json!({ "i": 3, "j": 1 }));
        assert_eq!(
            errors[0].message,
            "must NOT have duplicate items (items ## 1 and 3 are identical)"
        );
    }

    #[test]
    fn additional_property_is_named() {
        let errors = program(&json!({
            "properties": { "a": true },
            "additionalProperties": false
        }))
        .validate(&json!({ "a": 1, "b/c": 2 }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].params, json!({ "additionalProperty": "b/c" }));
    }

    #[test]
    fn recursive_schema_validates_nested_values() {
        let schema = json!({
            "$ref": "#/definitions/Tree",
            "definitions": {
                "Tree": {
                    "type": "object",
                    "properties": {
                        "children": { "type": "array", "items": { "$ref": "#/definitions/Tree" } }
                    }
                }
            }
        });
        let errors = program(&schema).validate(&json!({ "children": [{ "children": [1] }] }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].instance_path, "/children/0/children/0");
    }
}
