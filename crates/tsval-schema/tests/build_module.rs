use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tsval_config::SchemaConfig;
use tsval_core::{ManifestEntry, OutputLayout, SchemaDocument, SchemaNode, SchemaRef, TypeSelection};
use tsval_schema::{FunctionTypeFormatter, SchemaBuilder};

fn write(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir should succeed");
    }
    fs::write(path, contents).expect("write should succeed");
}

fn entry(module: &str, names: &[&str]) -> ManifestEntry {
    ManifestEntry {
        module: module.to_string(),
        selection: TypeSelection::Named(names.iter().map(|n| (*n).to_string()).collect()),
    }
}

#[test]
fn user_scenario_writes_one_document() {
    let tmp = TempDir::new().expect("tempdir should create");
    let src = tmp.path().join("src");
    write(
        &src,
        "models/user.ts",
        "export interface User { id: number; name: string }\n",
    );
    let layout = OutputLayout::new(&src, tmp.path().join("out"));

    let built = SchemaBuilder::with_source_introspector(SchemaConfig::default(), None)
        .build(&entry("./models/user", &["User"]), &src, &layout)
        .expect("user module should build");

    assert_eq!(built.schema_path, layout.schemas_dir().join("user.schema.json"));
    assert_eq!(built.definitions, vec!["User"]);

    let text = fs::read_to_string(&built.schema_path).expect("schema should exist");
    let document = SchemaDocument::from_json(&text).expect("schema should parse");
    assert_eq!(document.any_of, vec![SchemaRef::to_definition("User", true)]);
    assert_eq!(
        document.definitions.get("User").map(SchemaNode::to_value),
        Some(json!({
            "type": "object",
            "properties": {
                "id": { "type": "number" },
                "name": { "type": "string" }
            },
            "required": ["id", "name"]
        }))
    );
}

#[test]
fn callable_members_become_the_marker() {
    let tmp = TempDir::new().expect("tempdir should create");
    let src = tmp.path().join("src");
    write(
        &src,
        "service.ts",
        "export interface Service {\n  name: string;\n  start(): void;\n  onStop: (code: number) => void;\n  factory: new () => Service;\n}\n",
    );
    let builder = SchemaBuilder::with_source_introspector(SchemaConfig::default(), None);

    let document = builder
        .build_module(&src.join("service.ts"), &TypeSelection::Named(vec!["Service".into()]))
        .expect("service should build");

    let service = document
        .definitions
        .get("Service")
        .map(SchemaNode::to_value)
        .expect("Service definition");
    let marker = FunctionTypeFormatter::marker().to_value();
    for member in ["start", "onStop", "factory"] {
        assert_eq!(service["properties"][member], marker, "{member}");
    }
    assert_eq!(service["properties"]["name"], json!({ "type": "string" }));
}

#[test]
fn shared_base_lands_in_both_module_documents() {
    let tmp = TempDir::new().expect("tempdir should create");
    let src = tmp.path().join("src");
    write(&src, "base.ts", "export interface Base { id: number }\n");
    write(
        &src,
        "a.ts",
        "import { Base } from './base';\nexport interface A extends Base { a: string }\n",
    );
    write(
        &src,
        "b.ts",
        "import { Base } from './base';\nexport interface B extends Base { b: string }\n",
    );
    let layout = OutputLayout::new(&src, tmp.path().join("out"));
    let builder = SchemaBuilder::with_source_introspector(SchemaConfig::default(), None);

    let a = builder
        .build(&entry("./a", &["A"]), &src, &layout)
        .expect("a should build");
    let b = builder
        .build(&entry("./b", &["B"]), &src, &layout)
        .expect("b should build");

    assert_eq!(a.definitions, vec!["A", "Base"]);
    assert_eq!(b.definitions, vec!["B", "Base"]);
}
