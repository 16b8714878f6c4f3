//! Owned type IR lowered from the TypeScript syntax tree.
//!
//! The syntax tree borrows the source text; everything the formatter needs
//! is copied into these types so modules can be cached and resolved across
//! files without lifetimes.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Primitive(Primitive),
    Literal(Literal),
    /// Named reference, possibly qualified (`ns.Name`) and generic.
    Reference { name: String, args: Vec<TypeNode> },
    Array(Box<TypeNode>),
    Tuple(TupleType),
    Object(ObjectType),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    /// Function, method, or constructor signature.
    Function(FunctionSignature),
    /// Template literal type; always a string.
    TemplateLiteral,
    /// Syntax with no structural schema (conditional, mapped, `typeof`, ...).
    Unsupported { kind: String, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
    Any,
    Unknown,
    Never,
    Object,
    BigInt,
    Symbol,
}

impl Primitive {
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "null" => Self::Null,
            "undefined" => Self::Undefined,
            "void" => Self::Void,
            "any" => Self::Any,
            "unknown" => Self::Unknown,
            "never" => Self::Never,
            "object" => Self::Object,
            "bigint" => Self::BigInt,
            "symbol" => Self::Symbol,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Void => "void",
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Object => "object",
            Self::BigInt => "bigint",
            Self::Symbol => "symbol",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Literal {
    /// JSON Schema `type` keyword for this literal.
    #[must_use]
    pub const fn json_type(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleType {
    pub elements: Vec<TupleElement>,
    /// Element type of a trailing `...T[]`.
    pub rest: Option<Box<TypeNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub ty: TypeNode,
    pub optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectType {
    pub properties: Vec<Property>,
    /// Value type of a `[key: string]: T` index signature.
    pub index: Option<Box<TypeNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub text: String,
    pub constructor: bool,
}

/// Documentation and validation keywords read from a `/** ... */` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub description: Option<String>,
    /// JSON Schema keywords from tags such as `@minimum 0` or `@format email`.
    pub keywords: Vec<(String, Value)>,
}

impl Annotations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.keywords.is_empty()
    }
}

/// A named type declared in a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub exported: bool,
    pub type_params: Vec<TypeParam>,
    pub annotations: Annotations,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub default: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Interface {
        extends: Vec<TypeNode>,
        body: ObjectType,
    },
    Class {
        extends: Option<TypeNode>,
        body: ObjectType,
    },
    Alias(TypeNode),
    Enum(Vec<EnumMember>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    /// `None` when the initializer is a computed expression.
    pub value: Option<Literal>,
}

/// How a name was brought into scope by an `import`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Named(String),
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub imported: Imported,
    pub specifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReExport {
    Named {
        name: String,
        exported_as: String,
        specifier: String,
    },
    All {
        specifier: String,
    },
}

/// Everything tsval needs from one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDecls {
    pub path: PathBuf,
    pub declarations: Vec<Declaration>,
    pub imports: Vec<ImportBinding>,
    pub reexports: Vec<ReExport>,
}

impl ModuleDecls {
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Exported declarations in source order.
    pub fn exported(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.exported)
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.keyword()),
            Self::Literal(Literal::String(s)) => write!(f, "\"{s}\""),
            Self::Literal(Literal::Number(n)) => write!(f, "{n}"),
            Self::Literal(Literal::Bool(b)) => write!(f, "{b}"),
            Self::Reference { name, args } if args.is_empty() => f.write_str(name),
            Self::Reference { name, args } => {
                write!(f, "{name}<")?;
                write_joined(f, args, ",")?;
                f.write_str(">")
            }
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::Tuple(tuple) => {
                f.write_str("[")?;
                for (i, element) in tuple.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", element.ty)?;
                    if element.optional {
                        f.write_str("?")?;
                    }
                }
                if let Some(rest) = &tuple.rest {
                    write!(f, ",...{rest}[]")?;
                }
                f.write_str("]")
            }
            Self::Object(_) => f.write_str("object"),
            Self::Union(members) => write_joined(f, members, "|"),
            Self::Intersection(members) => write_joined(f, members, "&"),
            Self::Function(sig) => f.write_str(&sig.text),
            Self::TemplateLiteral => f.write_str("string"),
            Self::Unsupported { text, .. } => f.write_str(text),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeNode], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_display_is_compact() {
        let ty = TypeNode::Reference {
            name: "Page".into(),
            args: vec![
                TypeNode::Reference {
                    name: "User".into(),
                    args: vec![],
                },
                TypeNode::Primitive(Primitive::String),
            ],
        };
        assert_eq!(ty.to_string(), "Page<User,string>");
    }

    #[test]
    fn keywords_round_trip() {
        for keyword in ["string", "number", "unknown", "never", "bigint"] {
            let primitive = Primitive::from_keyword(keyword).expect("known keyword");
            assert_eq!(primitive.keyword(), keyword);
        }
        assert!(Primitive::from_keyword("Date").is_none());
    }
}
