//! [`ValidatorProgram`] → self-contained CommonJS module.
//!
//! Every compiled schema becomes a function `schemaN(data, instancePath)`
//! returning its error list; the exported `validate` function sets
//! `validate.errors` and returns a boolean. `validate.definitions` maps
//! each definition name to an entry point with the same calling
//! convention over that definition alone. Helper functions are required
//! from the runtime package's internal layout, which the compiler rewrites
//! to the local stub module.

use serde_json::{Value, json};

use crate::program::{
    Additional, CompiledSchema, JsonType, Rule, SchemaId, ValidatorProgram,
};

/// Package the emitted code requires helpers from.
pub const RUNTIME_PACKAGE: &str = "@tsval/runtime";

const IS_OBJECT: &str = "(data !== null && typeof data === \"object\" && !Array.isArray(data))";

/// Render `program` as a CommonJS module exporting `validate`.
#[must_use]
pub fn emit_module(program: &ValidatorProgram) -> String {
    let mut emitter = Emitter::default();
    for (index, schema) in program.schemas.iter().enumerate() {
        emitter.schema_function(SchemaId(index), schema);
    }
    emitter.finish(program.root, &program.definitions)
}

#[derive(Default)]
struct Emitter {
    body: Vec<String>,
    patterns: Vec<String>,
    uses_equal: bool,
    uses_ucs2length: bool,
}

impl Emitter {
    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        self.body.push(format!("{}{}", "  ".repeat(depth), text.as_ref()));
    }

    fn schema_function(&mut self, id: SchemaId, schema: &CompiledSchema) {
        self.line(0, format!("function {}(data, instancePath) {{", fn_name(id)));
        match schema {
            CompiledSchema::Bool { value: true, .. } => self.line(1, "return [];"),
            CompiledSchema::Bool {
                value: false,
                schema_path,
            } => {
                let error = error_literal(
                    &js_str(schema_path),
                    "false schema",
                    "{}",
                    &js_str("boolean schema is false"),
                );
                self.line(1, format!("return [{error}];"));
            }
            CompiledSchema::Rules { schema_path, rules } => {
                self.line(1, "const errors = [];");
                for rule in rules {
                    self.rule(rule, schema_path);
                }
                self.line(1, "return errors;");
            }
        }
        self.line(0, "}");
        self.line(0, "");
    }

    #[allow(clippy::too_many_lines)]
    fn rule(&mut self, rule: &Rule, schema_path: &str) {
        let at = |keyword: &str| js_str(&format!("{schema_path}/{keyword}"));
        let push = |keyword: &str, params: &Value, message: &str| {
            format!(
                "errors.push({});",
                error_literal(&at(keyword), keyword, &params.to_string(), &js_str(message))
            )
        };

        match rule {
            Rule::Ref(target) => {
                self.line(1, format!("errors.push(...{}(data, instancePath));", fn_name(*target)));
            }
            Rule::Type(types) => {
                let test = types.iter().map(|t| type_test(*t)).collect::<Vec<_>>().join(" || ");
                let names = types.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(",");
                self.line(1, format!("if (!({test})) {{"));
                self.line(2, push("type", &json!({ "type": names }), &format!("must be {names}")));
                self.line(1, "}");
            }
            Rule::Enum(values) => {
                self.uses_equal = true;
                let list = Value::Array(values.clone()).to_string();
                self.line(1, format!("if (!{list}.some((v) => equal(data, v))) {{"));
                self.line(
                    2,
                    push(
                        "enum",
                        &json!({ "allowedValues": values }),
                        "must be equal to one of the allowed values",
                    ),
                );
                self.line(1, "}");
            }
            Rule::Const(expected) => {
                self.uses_equal = true;
                self.line(1, format!("if (!equal(data, {expected})) {{"));
                self.line(
                    2,
                    push("const", &json!({ "allowedValue": expected }), "must be equal to constant"),
                );
                self.line(1, "}");
            }
            Rule::Properties(properties) => {
                self.line(1, format!("if {IS_OBJECT} {{"));
                for (name, id) in properties {
                    let key = js_str(name);
                    let path = js_str(&format!("/{}", crate::lower::escape_pointer(name)));
                    self.line(2, format!("if (hasOwn.call(data, {key})) {{"));
                    self.line(
                        3,
                        format!("errors.push(...{}(data[{key}], instancePath + {path}));", fn_name(*id)),
                    );
                    self.line(2, "}");
                }
                self.line(1, "}");
            }
            Rule::Required(names) => {
                self.line(1, format!("if {IS_OBJECT} {{"));
                self.line(2, format!("for (const key of {}) {{", json!(names)));
                self.line(3, "if (!hasOwn.call(data, key)) {");
                self.line(
                    4,
                    format!(
                        "errors.push({});",
                        error_literal(
                            &at("required"),
                            "required",
                            "{ missingProperty: key }",
                            "\"must have required property '\" + key + \"'\""
                        )
                    ),
                );
                self.line(3, "}");
                self.line(2, "}");
                self.line(1, "}");
            }
            Rule::AdditionalProperties { known, policy } => {
                self.line(1, format!("if {IS_OBJECT} {{"));
                self.line(2, "for (const key of Object.keys(data)) {");
                self.line(3, format!("if (!{}.includes(key)) {{", json!(known)));
                match policy {
                    Additional::Forbidden => self.line(
                        4,
                        format!(
                            "errors.push({});",
                            error_literal(
                                &at("additionalProperties"),
                                "additionalProperties",
                                "{ additionalProperty: key }",
                                &js_str("must NOT have additional properties")
                            )
                        ),
                    ),
                    Additional::Schema(id) => self.line(
                        4,
                        format!(
                            "errors.push(...{}(data[key], instancePath + \"/\" + escapePointer(key)));",
                            fn_name(*id)
                        ),
                    ),
                }
                self.line(3, "}");
                self.line(2, "}");
                self.line(1, "}");
            }
            Rule::Items(id) => {
                self.line(1, "if (Array.isArray(data)) {");
                self.line(2, "for (let i = 0; i < data.length; i++) {");
                self.line(3, format!("errors.push(...{}(data[i], instancePath + \"/\" + i));", fn_name(*id)));
                self.line(2, "}");
                self.line(1, "}");
            }
            Rule::TupleItems { items, additional } => {
                self.line(1, "if (Array.isArray(data)) {");
                for (i, id) in items.iter().enumerate() {
                    self.line(
                        2,
                        format!(
                            "if (data.length > {i}) errors.push(...{}(data[{i}], instancePath + \"/{i}\"));",
                            fn_name(*id)
                        ),
                    );
                }
                let n = items.len();
                match additional {
                    Some(Additional::Forbidden) => {
                        self.line(2, format!("if (data.length > {n}) {{"));
                        self.line(
                            3,
                            push(
                                "additionalItems",
                                &json!({ "limit": n }),
                                &format!("must NOT have more than {n} items"),
                            ),
                        );
                        self.line(2, "}");
                    }
                    Some(Additional::Schema(id)) => {
                        self.line(2, format!("for (let i = {n}; i < data.length; i++) {{"));
                        self.line(
                            3,
                            format!("errors.push(...{}(data[i], instancePath + \"/\" + i));", fn_name(*id)),
                        );
                        self.line(2, "}");
                    }
                    None => {}
                }
                self.line(1, "}");
            }
            Rule::UniqueItems => {
                self.uses_equal = true;
                self.line(1, "if (Array.isArray(data)) {");
                self.line(2, "search: for (let i = data.length - 1; i > 0; i--) {");
                self.line(3, "for (let j = i - 1; j >= 0; j--) {");
                self.line(4, "if (equal(data[i], data[j])) {");
                self.line(
                    5,
                    format!(
                        "errors.push({});",
                        error_literal(
                            &at("uniqueItems"),
                            "uniqueItems",
                            "{ i, j }",
                            "\"must NOT have duplicate items (items ## \" + j + \" and \" + i + \" are identical)\""
                        )
                    ),
                );
                self.line(5, "break search;");
                self.line(4, "}");
                self.line(3, "}");
                self.line(2, "}");
                self.line(1, "}");
            }
            Rule::Count { kind, limit } => {
                let (guard, length) = if kind.applies_to_strings() {
                    self.uses_ucs2length = true;
                    ("typeof data === \"string\"", "ucs2length(data)")
                } else {
                    ("Array.isArray(data)", "data.length")
                };
                let (op, relation) = if kind.is_min() { ("<", "fewer") } else { (">", "more") };
                self.line(1, format!("if ({guard} && {length} {op} {limit}) {{"));
                self.line(
                    2,
                    push(
                        kind.keyword(),
                        &json!({ "limit": limit }),
                        &format!("must NOT have {relation} than {limit} {}", kind.unit()),
                    ),
                );
                self.line(1, "}");
            }
            Rule::Pattern(pattern) => {
                let name = format!("pattern{}", self.patterns.len());
                self.patterns.push(pattern.source.clone());
                self.line(1, format!("if (typeof data === \"string\" && !{name}.test(data)) {{"));
                self.line(
                    2,
                    push(
                        "pattern",
                        &json!({ "pattern": pattern.source }),
                        &format!("must match pattern \"{}\"", pattern.source),
                    ),
                );
                self.line(1, "}");
            }
            Rule::Bound { bound, limit } => {
                let cmp = bound.comparison();
                self.line(1, format!("if (typeof data === \"number\" && !(data {cmp} {limit})) {{"));
                self.line(
                    2,
                    push(
                        bound.keyword(),
                        &json!({ "comparison": cmp, "limit": limit }),
                        &format!("must be {cmp} {limit}"),
                    ),
                );
                self.line(1, "}");
            }
            Rule::MultipleOf(divisor) => {
                self.line(1, format!("if (typeof data === \"number\" && data % {divisor} !== 0) {{"));
                self.line(
                    2,
                    push(
                        "multipleOf",
                        &json!({ "multipleOf": divisor }),
                        &format!("must be multiple of {divisor}"),
                    ),
                );
                self.line(1, "}");
            }
            Rule::AnyOf(branches) => {
                self.line(1, "{");
                self.line(2, "const branchErrors = [];");
                self.line(2, "let matched = false;");
                self.line(2, format!("for (const branch of [{}]) {{", fn_list(branches)));
                self.line(3, "const found = branch(data, instancePath);");
                self.line(3, "if (found.length === 0) {");
                self.line(4, "matched = true;");
                self.line(4, "break;");
                self.line(3, "}");
                self.line(3, "branchErrors.push(...found);");
                self.line(2, "}");
                self.line(2, "if (!matched) {");
                self.line(3, "errors.push(...branchErrors);");
                self.line(3, push("anyOf", &json!({}), "must match a schema in anyOf"));
                self.line(2, "}");
                self.line(1, "}");
            }
            Rule::AllOf(parts) => {
                for id in parts {
                    self.line(1, format!("errors.push(...{}(data, instancePath));", fn_name(*id)));
                }
            }
            Rule::OneOf(branches) => {
                self.line(1, "{");
                self.line(2, "const passing = [];");
                self.line(2, "const branchErrors = [];");
                self.line(2, format!("for (const [index, branch] of [{}].entries()) {{", fn_list(branches)));
                self.line(3, "const found = branch(data, instancePath);");
                self.line(3, "if (found.length === 0) passing.push(index);");
                self.line(3, "else branchErrors.push(...found);");
                self.line(3, "if (passing.length > 1) break;");
                self.line(2, "}");
                self.line(2, "if (passing.length !== 1) {");
                self.line(3, "if (passing.length === 0) errors.push(...branchErrors);");
                self.line(
                    3,
                    format!(
                        "errors.push({});",
                        error_literal(
                            &at("oneOf"),
                            "oneOf",
                            "{ passingSchemas: passing.length === 0 ? null : passing }",
                            &js_str("must match exactly one schema in oneOf")
                        )
                    ),
                );
                self.line(2, "}");
                self.line(1, "}");
            }
            Rule::Not(id) => {
                self.line(1, format!("if ({}(data, instancePath).length === 0) {{", fn_name(*id)));
                self.line(2, push("not", &json!({}), "must NOT be valid"));
                self.line(1, "}");
            }
        }
    }

    fn finish(self, root: SchemaId, definitions: &[(String, SchemaId)]) -> String {
        let mut out = vec![
            "\"use strict\";".to_string(),
            "module.exports = validate;".to_string(),
            "module.exports.default = validate;".to_string(),
        ];
        if self.uses_equal {
            out.push(format!("const {{ equal }} = require(\"{RUNTIME_PACKAGE}/dist/equal\");"));
        }
        if self.uses_ucs2length {
            out.push(format!(
                "const {{ ucs2length }} = require(\"{RUNTIME_PACKAGE}/dist/ucs2length\");"
            ));
        }
        out.push("const hasOwn = Object.prototype.hasOwnProperty;".to_string());
        out.push(
            "const escapePointer = (key) => key.replace(/~/g, \"~0\").replace(/\\//g, \"~1\");"
                .to_string(),
        );
        for (i, source) in self.patterns.iter().enumerate() {
            out.push(format!("const pattern{i} = new RegExp({}, \"u\");", js_str(source)));
        }
        out.push(String::new());
        out.extend(self.body);
        out.push("function validate(data, { instancePath = \"\" } = {}) {".to_string());
        out.push(format!("  const errors = {}(data, instancePath);", fn_name(root)));
        out.push("  validate.errors = errors.length > 0 ? errors : null;".to_string());
        out.push("  return errors.length === 0;".to_string());
        out.push("}".to_string());
        out.push("function entryPoint(schema) {".to_string());
        out.push("  const run = function (data, { instancePath = \"\" } = {}) {".to_string());
        out.push("    const errors = schema(data, instancePath);".to_string());
        out.push("    run.errors = errors.length > 0 ? errors : null;".to_string());
        out.push("    return errors.length === 0;".to_string());
        out.push("  };".to_string());
        out.push("  return run;".to_string());
        out.push("}".to_string());
        out.push("module.exports.definitions = {".to_string());
        for (name, id) in definitions {
            out.push(format!("  {}: entryPoint({}),", js_str(name), fn_name(*id)));
        }
        out.push("};".to_string());
        out.push(String::new());
        out.join("\n")
    }
}

fn fn_name(id: SchemaId) -> String {
    format!("schema{}", id.0)
}

fn fn_list(ids: &[SchemaId]) -> String {
    ids.iter().map(|id| fn_name(*id)).collect::<Vec<_>>().join(", ")
}

/// JavaScript string literal (JSON strings are valid JS strings).
fn js_str(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn type_test(ty: JsonType) -> &'static str {
    match ty {
        JsonType::Null => "data === null",
        JsonType::Boolean => "typeof data === \"boolean\"",
        JsonType::Object => IS_OBJECT,
        JsonType::Array => "Array.isArray(data)",
        JsonType::Number => "(typeof data === \"number\" && isFinite(data))",
        JsonType::Integer => "(typeof data === \"number\" && isFinite(data) && data % 1 === 0)",
        JsonType::String => "typeof data === \"string\"",
    }
}

fn error_literal(schema_path_js: &str, keyword: &str, params_js: &str, message_js: &str) -> String {
    format!(
        "{{ instancePath, schemaPath: {schema_path_js}, keyword: {}, params: {params_js}, message: {message_js} }}",
        js_str(keyword)
    )
}
