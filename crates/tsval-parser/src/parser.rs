//! ast-grep wrapper for TypeScript sources.

use std::path::Path;

use ast_grep_core::Node;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_language::{LanguageExt, SupportLang};

/// The concrete AST tree type returned by `parse_source`.
pub type AstTree = ast_grep_core::AstGrep<StrDoc<SupportLang>>;

/// Grammar for a source path: TSX for `.tsx`, TypeScript otherwise.
#[must_use]
pub fn language_for(path: &Path) -> SupportLang {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tsx") => SupportLang::Tsx,
        _ => SupportLang::TypeScript,
    }
}

/// Parse source code into an ast-grep tree for the given language.
#[must_use]
pub fn parse_source(source: &str, lang: SupportLang) -> AstTree {
    lang.ast_grep(source)
}

/// Text of the first `ERROR` node in the tree, if the parse recovered from
/// any syntax errors.
#[must_use]
pub fn first_syntax_error(tree: &AstTree) -> Option<String> {
    find_error(&tree.root())
}

fn find_error<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<String> {
    if node.kind().as_ref() == "ERROR" {
        let text = node.text();
        let snippet: String = text.chars().take(60).collect();
        return Some(snippet.trim().to_string());
    }
    node.children().find_map(|child| find_error(&child))
}

/// Unquote a TypeScript string literal node's text.
#[must_use]
pub fn unquote(text: &str) -> String {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix(['\'', '"', '`'])
        .and_then(|s| s.strip_suffix(['\'', '"', '`']))
        .unwrap_or(trimmed);
    inner.replace("\\'", "'").replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsx_extension_selects_tsx() {
        assert_eq!(language_for(Path::new("a/view.tsx")), SupportLang::Tsx);
        assert_eq!(language_for(Path::new("a/model.ts")), SupportLang::TypeScript);
        assert_eq!(language_for(Path::new("a/api.d.ts")), SupportLang::TypeScript);
    }

    #[test]
    fn parse_source_produces_program() {
        let tree = parse_source("export interface A { id: number }", SupportLang::TypeScript);
        assert_eq!(tree.root().kind().as_ref(), "program");
        assert!(first_syntax_error(&tree).is_none());
    }

    #[test]
    fn broken_source_reports_error() {
        let tree = parse_source("export { A } from './a';\n%%% ;", SupportLang::TypeScript);
        assert!(first_syntax_error(&tree).is_some());
    }

    #[test]
    fn unquote_strips_either_quote() {
        assert_eq!(unquote("'./models/user'"), "./models/user");
        assert_eq!(unquote("\"x\""), "x");
        assert_eq!(unquote("bare"), "bare");
    }
}
