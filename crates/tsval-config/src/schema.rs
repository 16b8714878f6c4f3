//! Schema builder options passed through to the introspector.

use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchemaConfig {
    /// Allow properties the type does not declare. When `false`, object
    /// schemas carry `additionalProperties: false`.
    #[serde(default = "default_true")]
    pub additional_properties: bool,

    /// Percent-encode definition names inside `$ref` pointers.
    #[serde(default = "default_true")]
    pub encode_refs: bool,

    /// Write the `exported` allow-list so only the requested names get
    /// public validate functions (referenced helper types are skipped).
    #[serde(default)]
    pub restrict_to_requested: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            additional_properties: true,
            encode_refs: true,
            restrict_to_requested: false,
        }
    }
}
