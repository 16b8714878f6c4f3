//! `/** ... */` documentation and validation annotations.

use ast_grep_core::Node;
use serde_json::Value;

use crate::types::Annotations;

/// Tags copied into the schema as keywords of the same name.
const KEYWORD_TAGS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "minItems",
    "maxItems",
    "uniqueItems",
    "default",
    "title",
];

/// Tags whose value is always kept as a raw string.
const STRING_TAGS: &[&str] = &["pattern", "format", "title"];

/// Annotations from the JSDoc block directly preceding `anchor`.
pub fn annotations_before<D: ast_grep_core::Doc>(anchor: &Node<D>) -> Annotations {
    anchor
        .prev()
        .filter(|prev| prev.kind().as_ref() == "comment")
        .map(|prev| prev.text().to_string())
        .filter(|text| text.starts_with("/**"))
        .map_or_else(Annotations::default, |text| parse_jsdoc(&text))
}

/// Parse a JSDoc block into a description and keyword annotations.
#[must_use]
pub fn parse_jsdoc(text: &str) -> Annotations {
    let body = text.trim_start_matches("/**").trim_end_matches("*/");
    let lines: Vec<&str> = body
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            let stripped = trimmed.trim_start_matches('*');
            stripped.strip_prefix(' ').unwrap_or(stripped).trim_end()
        })
        .collect();

    let mut description = Vec::new();
    let mut annotations = Annotations::default();
    let mut in_tags = false;

    for line in lines {
        if let Some(tag_line) = line.strip_prefix('@') {
            in_tags = true;
            let (tag, value) = tag_line
                .split_once(char::is_whitespace)
                .map_or((tag_line, ""), |(t, v)| (t, v.trim()));
            if tag == "description" {
                description.push(value.to_string());
            } else if KEYWORD_TAGS.contains(&tag) {
                annotations
                    .keywords
                    .push((tag.to_string(), tag_value(tag, value)));
            }
        } else if !in_tags {
            description.push(line.to_string());
        }
    }

    let description = description.join("\n").trim().to_string();
    if !description.is_empty() {
        annotations.description = Some(description);
    }
    annotations
}

fn tag_value(tag: &str, raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Bool(true);
    }
    if STRING_TAGS.contains(&tag) {
        return Value::String(raw.to_string());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
