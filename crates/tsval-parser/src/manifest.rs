//! Manifest extraction.
//!
//! The manifest is a TypeScript file made of re-export statements:
//!
//! ```typescript
//! export { User, Address } from './models/user';
//! export type { Order } from './models/order';
//! export * from './models/enums';
//! ```
//!
//! Each distinct module specifier becomes one [`Manifest`] entry. Named
//! re-exports request those names; `export *` (or an empty clause) requests
//! every exported type. Every other statement is ignored.

use std::path::{Path, PathBuf};

use ast_grep_core::Node;
use tsval_core::{Manifest, TypeSelection, walk};

use crate::error::ParserError;
use crate::parser::{first_syntax_error, language_for, parse_source, unquote};

/// Locate the manifest by recursive search from `root`.
///
/// # Errors
/// Returns `ParserError::ManifestNotFound` when no file is named `name`.
pub fn find_manifest(root: &Path, name: &str) -> Result<PathBuf, ParserError> {
    walk::find_file_named(root, name).ok_or_else(|| ParserError::ManifestNotFound {
        root: root.to_path_buf(),
        name: name.to_string(),
    })
}

/// Read and extract the manifest at `path`.
///
/// # Errors
/// `ManifestNotFound` if the file is absent, `ManifestUnreadable` if it
/// cannot be read as UTF-8 or does not parse cleanly.
pub fn extract_manifest(path: &Path) -> Result<Manifest, ParserError> {
    let source = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ParserError::ManifestNotFound {
            root: path.parent().map_or_else(PathBuf::new, Path::to_path_buf),
            name: path
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned()),
        },
        _ => ParserError::ManifestUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    parse_manifest(&source, path)
}

/// Extract manifest entries from already-loaded source text.
///
/// # Errors
/// Returns `ParserError::ManifestUnreadable` when the syntax tree contains
/// parse errors.
pub fn parse_manifest(source: &str, path: &Path) -> Result<Manifest, ParserError> {
    let tree = parse_source(source, language_for(path));
    if let Some(snippet) = first_syntax_error(&tree) {
        return Err(ParserError::ManifestUnreadable {
            path: path.to_path_buf(),
            reason: format!("syntax error near `{snippet}`"),
        });
    }

    let mut manifest = Manifest::new(path.to_path_buf());
    for statement in tree.root().children() {
        if statement.kind().as_ref() != "export_statement" {
            continue;
        }
        if let Some((module, selection)) = reexport_entry(&statement) {
            tracing::debug!(module = %module, ?selection, "manifest entry");
            manifest.insert(module, selection);
        }
    }
    Ok(manifest)
}

/// `(specifier, selection)` for a re-export statement; `None` for local
/// exports and declarations.
fn reexport_entry<D: ast_grep_core::Doc>(statement: &Node<D>) -> Option<(String, TypeSelection)> {
    let source = statement.field("source")?;
    let module = unquote(&source.text());

    let names: Vec<String> = statement
        .children()
        .filter(|c| c.kind().as_ref() == "export_clause")
        .flat_map(|clause| clause.children().collect::<Vec<_>>())
        .filter(|spec| spec.kind().as_ref() == "export_specifier")
        .filter_map(|spec| spec.field("name").map(|n| unquote(&n.text())))
        .collect();

    Some((module, TypeSelection::from(names)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn extract(source: &str) -> Manifest {
        parse_manifest(source, Path::new("/src/toJSONSchema.ts")).expect("manifest should parse")
    }

    fn named(names: &[&str]) -> TypeSelection {
        TypeSelection::Named(names.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn named_and_wildcard_reexports() {
        let manifest = extract(
            "export { User, Address } from './models/user';\n\
             export * from './models/enums';\n",
        );

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("./models/user"), Some(&named(&["User", "Address"])));
        assert_eq!(manifest.get("./models/enums"), Some(&TypeSelection::All));
    }

    #[rstest]
    #[case("export type { Order } from './order';", named(&["Order"]))]
    #[case("export { Order as PublicOrder } from './order';", named(&["Order"]))]
    #[case("export {} from './order';", TypeSelection::All)]
    #[case("export * as orders from './order';", TypeSelection::All)]
    fn reexport_forms(#[case] source: &str, #[case] expected: TypeSelection) {
        let manifest = extract(source);
        assert_eq!(manifest.get("./order"), Some(&expected));
    }

    #[test]
    fn other_statements_are_ignored() {
        let manifest = extract(
            "import { helper } from './helper';\n\
             export const VERSION = 1;\n\
             export interface Local { id: number }\n\
             export { helper };\n\
             export { User } from \"./user\";\n",
        );

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.entries[0].module, "./user");
    }

    #[test]
    fn one_entry_per_distinct_path_in_declaration_order() {
        let manifest = extract(
            "export { B } from './b';\n\
             export { A } from './a';\n\
             export { B2 } from './b';\n",
        );

        let modules: Vec<&str> = manifest.iter().map(|e| e.module.as_str()).collect();
        assert_eq!(modules, vec!["./b", "./a"]);
        assert_eq!(manifest.get("./b"), Some(&named(&["B2"])));
    }

    #[test]
    fn syntax_errors_are_unreadable() {
        let err = parse_manifest(
            "export { A } from './a';\n%%% ;",
            Path::new("/src/toJSONSchema.ts"),
        )
        .expect_err("broken manifest should fail");
        assert!(matches!(err, ParserError::ManifestUnreadable { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = extract_manifest(Path::new("/definitely/not/here/toJSONSchema.ts"))
            .expect_err("missing manifest should fail");
        assert!(matches!(err, ParserError::ManifestNotFound { .. }));
    }
}
