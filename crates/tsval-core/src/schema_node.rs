//! Typed JSON Schema tree.
//!
//! Schemas produced per requested type are folded into one combined schema
//! per module. The fold uses [`SchemaNode::merge`], which makes the rule
//! explicit:
//!
//! - object + object: recurse key by key (keys keep first-seen order)
//! - array + array: concatenate, earlier items first
//! - anything else: the later value replaces the earlier one

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A node in a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum SchemaNode {
    Object(ObjectNode),
    Array(Vec<SchemaNode>),
    Scalar(Scalar),
}

/// Leaf values. Containers are never stored here.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Insertion-ordered map of schema members.
///
/// Definition order drives the order of generated refs and validate
/// functions, so member order must survive a parse/serialize round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ObjectNode {
    members: Vec<(String, SchemaNode)>,
}

impl ObjectNode {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.members.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut SchemaNode> {
        self.members
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a member. A replaced member keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: SchemaNode) -> Option<SchemaNode> {
        let key = key.into();
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.members.push((key, value));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<SchemaNode> {
        let index = self.members.iter().position(|(k, _)| k == key)?;
        Some(self.members.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Deep-merge `later` into `self` following the [`SchemaNode::merge`] rule.
    pub fn merge_from(&mut self, later: Self) {
        for (key, incoming) in later.members {
            match self.get_mut(&key) {
                Some(slot) => {
                    let earlier = std::mem::replace(slot, SchemaNode::Scalar(Scalar::Null));
                    *slot = earlier.merge(incoming);
                }
                None => self.members.push((key, incoming)),
            }
        }
    }
}

impl FromIterator<(String, SchemaNode)> for ObjectNode {
    fn from_iter<I: IntoIterator<Item = (String, SchemaNode)>>(iter: I) -> Self {
        let mut node = Self::new();
        for (key, value) in iter {
            node.insert(key, value);
        }
        node
    }
}

impl IntoIterator for ObjectNode {
    type Item = (String, SchemaNode);
    type IntoIter = std::vec::IntoIter<(String, SchemaNode)>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl SchemaNode {
    /// Combine two nodes; `later` wins on conflicts that cannot recurse.
    /// Identical nodes merge to themselves, so a definition shared by two
    /// requested types keeps its tuple `items` and `enum` lists intact.
    #[must_use]
    pub fn merge(self, later: Self) -> Self {
        if self == later {
            return self;
        }
        match (self, later) {
            (Self::Object(mut earlier), Self::Object(later)) => {
                earlier.merge_from(later);
                Self::Object(earlier)
            }
            (Self::Array(mut earlier), Self::Array(later)) => {
                earlier.extend(later);
                Self::Array(earlier)
            }
            (_, later) => later,
        }
    }

    /// Build an object node from `(key, node)` pairs.
    pub fn object<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    #[must_use]
    pub const fn bool(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }

    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectNode> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(Scalar::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Scalar(Scalar::Number(n)) => n.as_u64(),
            _ => None,
        }
    }

    /// Member lookup on object nodes; `None` for every other variant.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Convert into a plain `serde_json::Value`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl From<Value> for SchemaNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(ObjectNode::from(map)),
        }
    }
}

impl From<SchemaNode> for Value {
    fn from(node: SchemaNode) -> Self {
        match node {
            SchemaNode::Scalar(Scalar::Null) => Self::Null,
            SchemaNode::Scalar(Scalar::Bool(b)) => Self::Bool(b),
            SchemaNode::Scalar(Scalar::Number(n)) => Self::Number(n),
            SchemaNode::Scalar(Scalar::String(s)) => Self::String(s),
            SchemaNode::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            SchemaNode::Object(object) => Self::Object(Map::from(object)),
        }
    }
}

impl From<Map<String, Value>> for ObjectNode {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            members: map
                .into_iter()
                .map(|(k, v)| (k, SchemaNode::from(v)))
                .collect(),
        }
    }
}

impl From<ObjectNode> for Map<String, Value> {
    fn from(object: ObjectNode) -> Self {
        object
            .members
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()
    }
}

impl From<ObjectNode> for Value {
    fn from(object: ObjectNode) -> Self {
        Self::Object(Map::from(object))
    }
}

impl TryFrom<Value> for ObjectNode {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(format!("expected a JSON object, found {other}")),
        }
    }
}

impl From<Scalar> for SchemaNode {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}
