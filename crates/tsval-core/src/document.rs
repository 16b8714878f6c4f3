//! Schema documents: the on-disk unit produced per module.

use serde::{Deserialize, Serialize};

use crate::schema_node::ObjectNode;

/// `$schema` marker written on every generated document.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// JSON pointer prefix of local definition references.
pub const DEFINITIONS_POINTER: &str = "#/definitions/";

/// Name of the custom keyword that restricts which definitions receive
/// public validate functions.
pub const EXPORTED_KEYWORD: &str = "exported";

/// A `{ "$ref": "#/definitions/<name>" }` alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub pointer: String,
}

impl SchemaRef {
    /// Reference a definition by name. With `encode` the name is
    /// percent-encoded so generic names such as `Page<User>` stay valid
    /// inside a URI fragment.
    #[must_use]
    pub fn to_definition(name: &str, encode: bool) -> Self {
        let name = if encode {
            urlencoding::encode(name).into_owned()
        } else {
            name.to_string()
        };
        Self {
            pointer: format!("{DEFINITIONS_POINTER}{name}"),
        }
    }

    /// Definition name this reference points at, percent-decoded.
    ///
    /// Returns `None` for references outside `#/definitions/`.
    #[must_use]
    pub fn definition_name(&self) -> Option<String> {
        definition_name_from_pointer(&self.pointer)
    }
}

/// Decode a `#/definitions/<name>` pointer into the definition name.
#[must_use]
pub fn definition_name_from_pointer(pointer: &str) -> Option<String> {
    let raw = pointer.strip_prefix(DEFINITIONS_POINTER)?;
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
    Some(decoded.replace("~1", "/").replace("~0", "~"))
}

/// A structural schema document.
///
/// Root alternatives live in `anyOf`; every alternative is a reference into
/// `definitions`. Unknown root keywords are kept in `extra` so a document
/// survives a read/write cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(rename = "anyOf", default)]
    pub any_of: Vec<SchemaRef>,

    #[serde(default)]
    pub definitions: ObjectNode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: ObjectNode,
}

impl SchemaDocument {
    /// Deep-merge `later` into this document.
    ///
    /// `anyOf` and `exported` concatenate, definitions merge recursively,
    /// and `$schema` takes the later value when present.
    #[must_use]
    pub fn merge(mut self, later: Self) -> Self {
        if later.schema.is_some() {
            self.schema = later.schema;
        }
        self.any_of.extend(later.any_of);
        self.definitions.merge_from(later.definitions);
        self.exported = match (self.exported, later.exported) {
            (Some(mut earlier), Some(later)) => {
                earlier.extend(later);
                Some(earlier)
            }
            (earlier, later) => later.or(earlier),
        };
        self.extra.merge_from(later.extra);
        self
    }

    /// Fold documents in order starting from the empty accumulator.
    pub fn combine<I: IntoIterator<Item = Self>>(documents: I) -> Self {
        documents.into_iter().fold(Self::default(), Self::merge)
    }

    /// Definition names in declaration order.
    #[must_use]
    pub fn definition_names(&self) -> Vec<String> {
        self.definitions.keys().map(str::to_string).collect()
    }

    /// `anyOf` pointers that do not resolve to a present definition.
    #[must_use]
    pub fn dangling_refs(&self) -> Vec<String> {
        self.any_of
            .iter()
            .filter(|r| {
                r.definition_name()
                    .is_none_or(|name| !self.definitions.contains_key(&name))
            })
            .map(|r| r.pointer.clone())
            .collect()
    }

    /// Whether `name` should receive a public validate function.
    #[must_use]
    pub fn is_exported(&self, name: &str) -> bool {
        self.exported
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|a| a == name))
    }

    /// Serialize as 2-space indented JSON.
    ///
    /// # Errors
    /// Returns the `serde_json` error when a member cannot be represented.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed JSON or a non-object root.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn doc(value: serde_json::Value) -> SchemaDocument {
        serde_json::from_value(value).expect("document should deserialize")
    }

    #[test]
    fn disjoint_merge_is_union_with_ordered_any_of() {
        let user = doc(json!({
            "$schema": DRAFT_07,
            "anyOf": [{ "$ref": "#/definitions/User" }],
            "definitions": { "User": { "type": "object" } }
        }));
        let order = doc(json!({
            "$schema": DRAFT_07,
            "anyOf": [{ "$ref": "#/definitions/Order" }],
            "definitions": { "Order": { "type": "object" } }
        }));

        let merged = SchemaDocument::combine([user, order]);
        assert_eq!(
            merged.any_of,
            vec![
                SchemaRef::to_definition("User", true),
                SchemaRef::to_definition("Order", true)
            ]
        );
        assert_eq!(merged.definition_names(), vec!["User", "Order"]);
        assert!(merged.dangling_refs().is_empty());
    }

    #[test]
    fn overlapping_definition_merges_recursively() {
        let first = doc(json!({
            "anyOf": [{ "$ref": "#/definitions/Base" }],
            "definitions": {
                "Base": { "type": "object", "required": ["id"], "description": "one" }
            }
        }));
        let second = doc(json!({
            "anyOf": [{ "$ref": "#/definitions/Base" }],
            "definitions": {
                "Base": { "type": "object", "required": ["name"], "description": "two" }
            }
        }));

        let merged = first.merge(second);
        assert_eq!(merged.any_of.len(), 2, "duplicate alternatives are kept");
        assert_eq!(
            merged.definitions.get("Base").map(crate::SchemaNode::to_value),
            Some(json!({ "type": "object", "required": ["id", "name"], "description": "two" }))
        );
    }

    #[test]
    fn exported_lists_concatenate() {
        let a = SchemaDocument {
            exported: Some(vec!["A".into()]),
            ..SchemaDocument::default()
        };
        let b = SchemaDocument {
            exported: Some(vec!["B".into()]),
            ..SchemaDocument::default()
        };
        let none = SchemaDocument::default();

        let merged = a.merge(none).merge(b);
        assert_eq!(merged.exported, Some(vec!["A".to_string(), "B".to_string()]));
        assert!(merged.is_exported("B"));
        assert!(!merged.is_exported("C"));
    }

    #[test]
    fn missing_allow_list_exports_everything() {
        assert!(SchemaDocument::default().is_exported("Anything"));
    }

    #[test]
    fn dangling_refs_reported() {
        let document = doc(json!({
            "anyOf": [{ "$ref": "#/definitions/Missing" }, { "$ref": "other.json" }],
            "definitions": {}
        }));
        assert_eq!(
            document.dangling_refs(),
            vec!["#/definitions/Missing".to_string(), "other.json".to_string()]
        );
    }

    #[test]
    fn encoded_refs_decode_back() {
        let reference = SchemaRef::to_definition("Page<User>", true);
        assert_eq!(reference.pointer, "#/definitions/Page%3CUser%3E");
        assert_eq!(reference.definition_name().as_deref(), Some("Page<User>"));
    }

    #[test]
    fn unknown_root_keywords_round_trip() {
        let text = r#"{"$schema":"x","anyOf":[],"definitions":{},"title":"kept"}"#;
        let parsed = SchemaDocument::from_json(text).expect("parse");
        assert_eq!(parsed.extra.get("title").and_then(|n| n.as_str()), Some("kept"));
        assert_eq!(serde_json::to_string(&parsed).expect("serialize"), text);
    }
}
