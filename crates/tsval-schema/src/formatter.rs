//! Override for callable members.
//!
//! Functions cannot be validated structurally; any property whose type is a
//! function, method or constructor signature is rendered as a fixed marker
//! object instead of failing introspection.

use serde_json::json;
use tsval_core::SchemaNode;
use tsval_parser::{SubTypeFormatter, TypeNode};

pub struct FunctionTypeFormatter;

impl FunctionTypeFormatter {
    /// `{ "type": "object", "properties": { "isFunction": { "type": "boolean", "const": true } } }`
    #[must_use]
    pub fn marker() -> SchemaNode {
        SchemaNode::from(json!({
            "type": "object",
            "properties": {
                "isFunction": { "type": "boolean", "const": true }
            }
        }))
    }
}

impl SubTypeFormatter for FunctionTypeFormatter {
    fn supports(&self, ty: &TypeNode) -> bool {
        matches!(ty, TypeNode::Function(_))
    }

    fn format(&self, _ty: &TypeNode) -> SchemaNode {
        Self::marker()
    }
}
