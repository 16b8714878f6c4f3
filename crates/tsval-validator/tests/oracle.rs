//! The in-process evaluator must agree with an independent draft-07
//! implementation on validity.

use rstest::rstest;
use serde_json::{Value, json};
use tsval_validator::lower_schema;

fn assert_agrees(schema: &Value, instances: &[Value]) {
    let oracle = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .build(schema)
        .expect("oracle should accept the schema");
    let program = lower_schema(schema).expect("schema should lower");
    for instance in instances {
        assert_eq!(
            program.is_valid(instance),
            oracle.is_valid(instance),
            "disagreement on {instance} against {schema}"
        );
        assert_eq!(program.validate(instance).is_empty(), program.is_valid(instance));
    }
}

fn user_document() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "anyOf": [{ "$ref": "#/definitions/User" }],
        "definitions": {
            "User": {
                "type": "object",
                "properties": {
                    "id": { "type": "number" },
                    "name": { "type": "string", "minLength": 1 },
                    "role": { "$ref": "#/definitions/Role" },
                    "onLogin": {
                        "type": "object",
                        "properties": { "isFunction": { "type": "boolean", "const": true } }
                    }
                },
                "required": ["id", "name", "role"],
                "additionalProperties": false
            },
            "Role": { "type": "string", "enum": ["admin", "member"] }
        }
    })
}

#[test]
fn user_document_agrees() {
    assert_agrees(
        &user_document(),
        &[
            json!({ "id": 1, "name": "Ada", "role": "admin" }),
            json!({ "id": 1, "name": "Ada", "role": "admin", "onLogin": { "isFunction": true } }),
            json!({ "id": 1, "name": "Ada", "role": "admin", "onLogin": { "isFunction": false } }),
            json!({ "id": "1", "name": "Ada", "role": "admin" }),
            json!({ "id": 1, "name": "", "role": "admin" }),
            json!({ "id": 1, "name": "Ada", "role": "owner" }),
            json!({ "id": 1, "name": "Ada" }),
            json!({ "id": 1, "name": "Ada", "role": "member", "extra": true }),
            json!([]),
            json!(null),
        ],
    );
}

#[test]
fn recursive_definitions_agree() {
    let schema = json!({
        "anyOf": [{ "$ref": "#/definitions/Tree" }],
        "definitions": {
            "Tree": {
                "type": "object",
                "properties": {
                    "value": { "type": "integer" },
                    "children": { "type": "array", "items": { "$ref": "#/definitions/Tree" } }
                },
                "required": ["value"]
            }
        }
    });
    assert_agrees(
        &schema,
        &[
            json!({ "value": 1 }),
            json!({ "value": 1, "children": [{ "value": 2, "children": [] }] }),
            json!({ "value": 1, "children": [{ "value": 2.5 }] }),
            json!({ "value": 1, "children": [{}] }),
        ],
    );
}

#[rstest]
#[case::tuple(
    json!({ "type": "array", "items": [{ "type": "number" }, { "type": "string" }], "minItems": 2, "additionalItems": false }),
    vec![json!([1, "a"]), json!([1]), json!([1, "a", true]), json!(["a", 1])]
)]
#[case::unique(
    json!({ "type": "array", "uniqueItems": true }),
    vec![json!([1, 2, 3]), json!([1, 1]), json!([{ "a": 1 }, { "a": 1 }]), json!([[1], [2]])]
)]
#[case::numeric(
    json!({ "type": "number", "minimum": 0, "exclusiveMaximum": 10, "multipleOf": 0.5 }),
    vec![json!(0), json!(9.5), json!(10), json!(-1), json!(0.25)]
)]
#[case::composition(
    json!({ "oneOf": [{ "type": "string" }, { "type": "string", "maxLength": 2 }], "not": { "const": "zzz" } }),
    vec![json!("abc"), json!("ab"), json!("zzz"), json!(1)]
)]
#[case::all_of(
    json!({ "allOf": [{ "required": ["a"] }, { "required": ["b"] }] }),
    vec![json!({ "a": 1, "b": 2 }), json!({ "a": 1 }), json!("not an object")]
)]
#[case::pattern(
    json!({ "type": "string", "pattern": "^[a-z]+-\\d+$" }),
    vec![json!("abc-12"), json!("ABC-12"), json!("abc-")]
)]
#[case::nullable_union(
    json!({ "type": ["string", "null"], "enum": ["a", "b", null] }),
    vec![json!("a"), json!(null), json!("c"), json!(1)]
)]
#[case::record(
    json!({ "type": "object", "additionalProperties": { "type": "boolean" } }),
    vec![json!({}), json!({ "x": true }), json!({ "x": 1 })]
)]
#[case::boolean_schemas(
    json!({ "properties": { "never": false, "always": true } }),
    vec![json!({}), json!({ "always": [1] }), json!({ "never": 0 })]
)]
fn keyword_semantics_agree(#[case] schema: Value, #[case] instances: Vec<Value>) {
    assert_agrees(&schema, &instances);
}
