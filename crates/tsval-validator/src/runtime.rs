//! Local helper module and the rewrite that points generated code at it.

use std::sync::LazyLock;

use regex::Regex;

use crate::emit::RUNTIME_PACKAGE;
use crate::error::CompileError;

/// Module path generated validators import helpers from after rewriting.
pub const LOCAL_RUNTIME_SPECIFIER: &str = "./runtime";

/// Helper functions the generated validators call.
pub const RUNTIME_JS: &str = r#""use strict";
// Generated by tsval. Helpers shared by the validator modules in this directory.

function equal(a, b) {
  if (a === b) return true;
  if (a && b && typeof a === "object" && typeof b === "object") {
    if (Array.isArray(a)) {
      if (!Array.isArray(b) || a.length !== b.length) return false;
      for (let i = 0; i < a.length; i++) {
        if (!equal(a[i], b[i])) return false;
      }
      return true;
    }
    if (Array.isArray(b)) return false;
    const keys = Object.keys(a);
    if (keys.length !== Object.keys(b).length) return false;
    for (const key of keys) {
      if (!Object.prototype.hasOwnProperty.call(b, key) || !equal(a[key], b[key])) return false;
    }
    return true;
  }
  return a !== a && b !== b;
}

function ucs2length(str) {
  let length = 0;
  let pos = 0;
  while (pos < str.length) {
    length++;
    const code = str.charCodeAt(pos++);
    if (code >= 0xd800 && code <= 0xdbff && pos < str.length) {
      const next = str.charCodeAt(pos);
      if ((next & 0xfc00) === 0xdc00) pos++;
    }
  }
  return length;
}

module.exports = { equal, ucs2length };
"#;

static INTERNAL_REFERENCE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(&internal_reference_pattern()));

fn internal_reference_pattern() -> String {
    format!("\"{}/[^)]*", regex::escape(RUNTIME_PACKAGE))
}

/// Replace every `"@tsval/runtime/..."` module reference with the local
/// stub so the generated code carries no dependency on the compiler.
///
/// # Errors
/// `InvalidPattern` if the reference pattern itself fails to compile.
pub fn rewrite_internal_refs(code: &str) -> Result<String, CompileError> {
    let pattern = INTERNAL_REFERENCE
        .as_ref()
        .map_err(|source| CompileError::InvalidPattern {
            pattern: internal_reference_pattern(),
            source: source.clone(),
        })?;
    Ok(pattern
        .replace_all(code, format!("\"{LOCAL_RUNTIME_SPECIFIER}\"").as_str())
        .into_owned())
}
