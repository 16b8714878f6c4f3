//! [`GeneratedModule`] → source text.

use std::fmt::Write as _;

use crate::ir::GeneratedModule;

pub trait Printer {
    fn print(&self, module: &GeneratedModule) -> String;
}

/// Renders the module as TypeScript with ES imports of the CommonJS
/// validators. Each function calls its definition's own entry point, so
/// a value matching only a sibling type is still rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptPrinter;

impl Printer for TypeScriptPrinter {
    fn print(&self, module: &GeneratedModule) -> String {
        let mut out = String::new();
        for line in &module.header {
            let _ = writeln!(out, "// {line}");
        }
        if !module.header.is_empty() {
            out.push('\n');
        }
        for import in &module.imports {
            let _ = writeln!(
                out,
                "import {} from \"{}\";",
                import.binding,
                import.specifier.replace('\\', "\\\\").replace('"', "\\\"")
            );
        }
        for function in &module.functions {
            out.push('\n');
            let _ = writeln!(out, "export function {}(data: unknown): any[] {{", function.name);
            let _ = writeln!(
                out,
                "  const validate = {}.definitions[{}];",
                function.validator,
                serde_json::Value::String(function.definition.clone())
            );
            out.push_str("  return validate(data) ? [] : validate.errors;\n");
            out.push_str("}\n");
        }
        out
    }
}
