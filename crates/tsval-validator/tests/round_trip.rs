//! Schema file → written validator module → in-process validation.

use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;
use tsval_core::OutputLayout;
use tsval_validator::{ValidatorCompiler, discover_schemas};

fn seed(layout: &OutputLayout) {
    let dir = layout.schemas_dir();
    std::fs::create_dir_all(&dir).expect("schemas dir should be created");
    let user = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "anyOf": [{ "$ref": "#/definitions/User" }],
        "definitions": {
            "User": {
                "type": "object",
                "properties": { "id": { "type": "number" }, "name": { "type": "string" } },
                "required": ["id", "name"],
                "additionalProperties": false
            }
        }
    });
    std::fs::write(dir.join("user.schema.json"), user.to_string())
        .expect("schema should be written");
}

fn layout(root: &Path) -> OutputLayout {
    OutputLayout::new(root.join("src"), root.join("out"))
}

#[test]
fn matching_value_has_no_errors_and_violation_reports_some() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let layout = layout(dir.path());
    seed(&layout);

    let compiler = ValidatorCompiler::standalone();
    let schemas = discover_schemas(&layout.schemas_dir());
    let report = compiler.compile_all(&schemas, &layout);
    assert!(report.failed.is_empty());
    let user = &report.compiled[0];

    assert_eq!(user.refs, vec!["User".to_string()]);
    let ok = user
        .validate("User", &json!({ "id": 1, "name": "Ada" }))
        .expect("User should have an entry point");
    assert!(ok.is_empty());

    let errors = user
        .validate("User", &json!({ "id": "x", "name": "Ada" }))
        .expect("User should have an entry point");
    assert!(!errors.is_empty());
    assert!(errors.iter().any(|e| e.instance_path == "/id" && e.keyword == "type"));

    let module = std::fs::read_to_string(layout.validation_dir().join("user.validate.js"))
        .expect("module should be written");
    assert!(module.contains("module.exports = validate;"));
    assert!(module.contains("\"User\": entryPoint("));
}

#[test]
fn rerun_overwrites_modules() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let layout = layout(dir.path());
    seed(&layout);
    std::fs::create_dir_all(layout.validation_dir()).expect("dir should be created");
    std::fs::write(layout.validation_dir().join("user.validate.js"), "stale")
        .expect("write should succeed");

    let compiler = ValidatorCompiler::standalone();
    let report = compiler.compile_all(&discover_schemas(&layout.schemas_dir()), &layout);

    let module = std::fs::read_to_string(&report.compiled[0].module_path)
        .expect("module should be written");
    assert_ne!(module, "stale");
}
