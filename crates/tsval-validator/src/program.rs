//! Rule IR shared by the JavaScript emitter and the in-process evaluator.
//!
//! A [`ValidatorProgram`] is a flat table of compiled schemas. Every
//! subschema gets its own slot; `$ref` targets are compiled once and
//! referenced by [`SchemaId`], so recursive definitions are plain cycles in
//! the table.

use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(pub usize);

/// JSON Schema primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl JsonType {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Self::Null,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "array" => Self::Array,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "string" => Self::String,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

/// Policy for members not covered by `properties` / tuple `items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Additional {
    Forbidden,
    Schema(SchemaId),
}

/// Numeric bound kinds, each with its comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
}

impl Bound {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::ExclusiveMinimum => "exclusiveMinimum",
            Self::ExclusiveMaximum => "exclusiveMaximum",
        }
    }

    /// Operator the value must satisfy against the limit.
    #[must_use]
    pub const fn comparison(self) -> &'static str {
        match self {
            Self::Minimum => ">=",
            Self::Maximum => "<=",
            Self::ExclusiveMinimum => ">",
            Self::ExclusiveMaximum => "<",
        }
    }

    #[must_use]
    pub fn holds(self, value: f64, limit: f64) -> bool {
        match self {
            Self::Minimum => value >= limit,
            Self::Maximum => value <= limit,
            Self::ExclusiveMinimum => value > limit,
            Self::ExclusiveMaximum => value < limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    MinItems,
    MaxItems,
    MinLength,
    MaxLength,
}

impl CountKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::MinItems => "minItems",
            Self::MaxItems => "maxItems",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
        }
    }

    #[must_use]
    pub const fn is_min(self) -> bool {
        matches!(self, Self::MinItems | Self::MinLength)
    }

    /// Unit used in error messages.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::MinItems | Self::MaxItems => "items",
            Self::MinLength | Self::MaxLength => "characters",
        }
    }

    #[must_use]
    pub const fn applies_to_strings(self) -> bool {
        matches!(self, Self::MinLength | Self::MaxLength)
    }
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: String,
    pub regex: Regex,
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// One keyword check.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Ref(SchemaId),
    Type(Vec<JsonType>),
    Enum(Vec<Value>),
    Const(Value),
    Properties(Vec<(String, SchemaId)>),
    Required(Vec<String>),
    AdditionalProperties {
        known: Vec<String>,
        policy: Additional,
    },
    Items(SchemaId),
    TupleItems {
        items: Vec<SchemaId>,
        additional: Option<Additional>,
    },
    UniqueItems,
    Count {
        kind: CountKind,
        limit: u64,
    },
    Pattern(Pattern),
    Bound {
        bound: Bound,
        limit: Number,
    },
    MultipleOf(Number),
    AnyOf(Vec<SchemaId>),
    AllOf(Vec<SchemaId>),
    OneOf(Vec<SchemaId>),
    Not(SchemaId),
}

/// A compiled (sub)schema.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledSchema {
    /// `true` accepts everything, `false` nothing.
    Bool { schema_path: String, value: bool },
    Rules {
        schema_path: String,
        rules: Vec<Rule>,
    },
}

impl CompiledSchema {
    #[must_use]
    pub fn schema_path(&self) -> &str {
        match self {
            Self::Bool { schema_path, .. } | Self::Rules { schema_path, .. } => schema_path,
        }
    }
}

/// Compiled validator for one schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorProgram {
    pub root: SchemaId,
    pub schemas: Vec<CompiledSchema>,
    /// Entry point per definition name, in document order.
    pub definitions: Vec<(String, SchemaId)>,
}

impl ValidatorProgram {
    #[must_use]
    pub fn schema(&self, id: SchemaId) -> &CompiledSchema {
        &self.schemas[id.0]
    }

    #[must_use]
    pub fn definition(&self, name: &str) -> Option<SchemaId> {
        self.definitions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }
}

/// One validation failure, shaped like the error objects the generated
/// JavaScript reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub instance_path: String,
    pub schema_path: String,
    pub keyword: String,
    pub params: Value,
    pub message: String,
}
