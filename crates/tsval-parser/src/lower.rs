//! Lower a TypeScript syntax tree into [`ModuleDecls`].

use std::path::Path;

use ast_grep_core::Node;

use crate::error::IntrospectError;
use crate::jsdoc::annotations_before;
use crate::parser::{first_syntax_error, language_for, parse_source, unquote};
use crate::types::{
    DeclKind, Declaration, EnumMember, FunctionSignature, ImportBinding, Imported, Literal,
    ModuleDecls, ObjectType, Primitive, Property, ReExport, TupleElement, TupleType, TypeNode,
    TypeParam,
};

/// Parse `source` (the contents of `path`) and collect its declarations,
/// imports, and re-exports.
///
/// # Errors
/// Returns `IntrospectError::ModuleSyntax` when the tree has parse errors.
pub fn lower_module(source: &str, path: &Path) -> Result<ModuleDecls, IntrospectError> {
    let tree = parse_source(source, language_for(path));
    if let Some(snippet) = first_syntax_error(&tree) {
        return Err(IntrospectError::ModuleSyntax {
            path: path.to_path_buf(),
            snippet,
        });
    }

    let mut module = ModuleDecls {
        path: path.to_path_buf(),
        ..ModuleDecls::default()
    };
    let mut local_exports = Vec::new();

    for statement in tree.root().children() {
        match statement.kind().as_ref() {
            "export_statement" => lower_export(&statement, &mut module, &mut local_exports),
            "import_statement" => lower_import(&statement, &mut module),
            "ambient_declaration" => {
                for child in statement.children() {
                    if let Some(decl) = lower_declaration(&child, &statement, false) {
                        module.declarations.push(decl);
                    }
                }
            }
            _ => {
                if let Some(decl) = lower_declaration(&statement, &statement, false) {
                    module.declarations.push(decl);
                }
            }
        }
    }

    for name in local_exports {
        if let Some(decl) = module.declarations.iter_mut().find(|d| d.name == name) {
            decl.exported = true;
        }
    }
    Ok(module)
}

// ── statements ─────────────────────────────────────────────────────

fn lower_export<D: ast_grep_core::Doc>(
    statement: &Node<D>,
    module: &mut ModuleDecls,
    local_exports: &mut Vec<String>,
) {
    let specifier = statement.field("source").map(|s| unquote(&s.text()));
    let clause = statement
        .children()
        .find(|c| c.kind().as_ref() == "export_clause");

    match (specifier, clause) {
        (Some(specifier), Some(clause)) => {
            for spec in clause
                .children()
                .filter(|c| c.kind().as_ref() == "export_specifier")
            {
                let Some(name) = spec.field("name").map(|n| unquote(&n.text())) else {
                    continue;
                };
                let exported_as = spec
                    .field("alias")
                    .map_or_else(|| name.clone(), |a| unquote(&a.text()));
                module.reexports.push(ReExport::Named {
                    name,
                    exported_as,
                    specifier: specifier.clone(),
                });
            }
        }
        (Some(specifier), None) => {
            let is_namespace = statement
                .children()
                .any(|c| c.kind().as_ref() == "namespace_export");
            if !is_namespace {
                module.reexports.push(ReExport::All { specifier });
            }
        }
        (None, Some(clause)) => {
            local_exports.extend(
                clause
                    .children()
                    .filter(|c| c.kind().as_ref() == "export_specifier")
                    .filter_map(|spec| spec.field("name").map(|n| n.text().to_string())),
            );
        }
        (None, None) => {
            for child in statement.children() {
                if child.kind().as_ref() == "ambient_declaration" {
                    for inner in child.children() {
                        if let Some(decl) = lower_declaration(&inner, statement, true) {
                            module.declarations.push(decl);
                        }
                    }
                } else if let Some(decl) = lower_declaration(&child, statement, true) {
                    module.declarations.push(decl);
                }
            }
        }
    }
}

fn lower_import<D: ast_grep_core::Doc>(statement: &Node<D>, module: &mut ModuleDecls) {
    let Some(specifier) = statement.field("source").map(|s| unquote(&s.text())) else {
        return;
    };
    let Some(clause) = statement
        .children()
        .find(|c| c.kind().as_ref() == "import_clause")
    else {
        return;
    };

    for part in clause.children() {
        match part.kind().as_ref() {
            "named_imports" => {
                for spec in part
                    .children()
                    .filter(|c| c.kind().as_ref() == "import_specifier")
                {
                    let Some(name) = spec.field("name").map(|n| unquote(&n.text())) else {
                        continue;
                    };
                    let local = spec
                        .field("alias")
                        .map_or_else(|| name.clone(), |a| a.text().to_string());
                    module.imports.push(ImportBinding {
                        local,
                        imported: Imported::Named(name),
                        specifier: specifier.clone(),
                    });
                }
            }
            "namespace_import" => {
                if let Some(ident) = part
                    .children()
                    .find(|c| c.kind().as_ref() == "identifier")
                {
                    module.imports.push(ImportBinding {
                        local: ident.text().to_string(),
                        imported: Imported::Namespace,
                        specifier: specifier.clone(),
                    });
                }
            }
            _ => {}
        }
    }
}

// ── declarations ───────────────────────────────────────────────────

fn lower_declaration<D: ast_grep_core::Doc>(
    node: &Node<D>,
    doc_anchor: &Node<D>,
    exported: bool,
) -> Option<Declaration> {
    let kind = match node.kind().as_ref() {
        "interface_declaration" => {
            let extends = node
                .children()
                .filter(|c| c.kind().as_ref() == "extends_type_clause")
                .flat_map(|clause| named_children(&clause))
                .map(|t| lower_type(&t))
                .collect();
            let body = node
                .field("body")
                .map(|b| lower_members(&b))
                .unwrap_or_default();
            DeclKind::Interface { extends, body }
        }
        "class_declaration" | "abstract_class_declaration" => {
            let body = node
                .field("body")
                .map(|b| lower_members(&b))
                .unwrap_or_default();
            DeclKind::Class {
                extends: class_extends(node),
                body,
            }
        }
        "type_alias_declaration" => DeclKind::Alias(node.field("value").map_or(
            TypeNode::Primitive(Primitive::Unknown),
            |v| lower_type(&v),
        )),
        "enum_declaration" => {
            DeclKind::Enum(node.field("body").map(|b| lower_enum(&b)).unwrap_or_default())
        }
        _ => return None,
    };

    Some(Declaration {
        name: node.field("name")?.text().to_string(),
        exported,
        type_params: type_params(node),
        annotations: annotations_before(doc_anchor),
        kind,
    })
}

fn type_params<D: ast_grep_core::Doc>(node: &Node<D>) -> Vec<TypeParam> {
    let Some(params) = node.field("type_parameters") else {
        return Vec::new();
    };
    params
        .children()
        .filter(|p| p.kind().as_ref() == "type_parameter")
        .filter_map(|p| {
            let name = p.field("name")?.text().to_string();
            let default = p
                .field("value")
                .and_then(|d| first_named(&d))
                .map(|t| lower_type(&t));
            Some(TypeParam { name, default })
        })
        .collect()
}

fn class_extends<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<TypeNode> {
    let heritage = node
        .children()
        .find(|c| c.kind().as_ref() == "class_heritage")?;
    let clause = heritage
        .children()
        .find(|c| c.kind().as_ref() == "extends_clause")?;
    let value = clause.field("value")?;
    let args = clause
        .field("type_arguments")
        .map(|a| named_children(&a).iter().map(lower_type).collect())
        .unwrap_or_default();
    Some(TypeNode::Reference {
        name: value.text().to_string(),
        args,
    })
}

fn lower_enum<D: ast_grep_core::Doc>(body: &Node<D>) -> Vec<EnumMember> {
    let mut members = Vec::new();
    let mut next: Option<i64> = Some(0);

    for child in body.children() {
        let (name, value) = match child.kind().as_ref() {
            "property_identifier" | "string" => {
                (unquote(&child.text()), next.map(|n| Literal::Number(n.into())))
            }
            "enum_assignment" => {
                let Some(name) = child.field("name").map(|n| unquote(&n.text())) else {
                    continue;
                };
                let value = child.field("value").and_then(|v| match v.kind().as_ref() {
                    "string" => Some(Literal::String(unquote(&v.text()))),
                    "number" | "unary_expression" => parse_number(&v.text()).map(Literal::Number),
                    _ => None,
                });
                (name, value)
            }
            _ => continue,
        };
        next = match &value {
            Some(Literal::Number(n)) => n.as_i64().map(|n| n + 1),
            _ => None,
        };
        members.push(EnumMember { name, value });
    }
    members
}

// ── object members ─────────────────────────────────────────────────

fn lower_members<D: ast_grep_core::Doc>(body: &Node<D>) -> ObjectType {
    let mut object = ObjectType::default();

    for member in body.children() {
        match member.kind().as_ref() {
            "property_signature" | "public_field_definition" => {
                if !is_public_instance_member(&member) {
                    continue;
                }
                let Some(name) = member.field("name").and_then(|n| property_name(&n)) else {
                    continue;
                };
                let ty = member.field("type").map_or(
                    TypeNode::Primitive(Primitive::Any),
                    |t| lower_type(&t),
                );
                object.properties.push(Property {
                    name,
                    ty,
                    optional: has_token(&member, "?"),
                    annotations: annotations_before(&member),
                });
            }
            "method_signature" => {
                let Some(name) = member.field("name").and_then(|n| property_name(&n)) else {
                    continue;
                };
                object.properties.push(Property {
                    name,
                    ty: TypeNode::Function(FunctionSignature {
                        text: member.text().to_string(),
                        constructor: false,
                    }),
                    optional: has_token(&member, "?"),
                    annotations: annotations_before(&member),
                });
            }
            "index_signature" => {
                let index = if has_token(&member, "mapped_type_clause") {
                    TypeNode::Unsupported {
                        kind: "mapped".into(),
                        text: member.text().to_string(),
                    }
                } else {
                    member.field("type").map_or(
                        TypeNode::Primitive(Primitive::Any),
                        |t| lower_type(&t),
                    )
                };
                object.index = Some(Box::new(index));
            }
            _ => {}
        }
    }
    object
}

fn is_public_instance_member<D: ast_grep_core::Doc>(member: &Node<D>) -> bool {
    let hidden = member.children().any(|c| match c.kind().as_ref() {
        "accessibility_modifier" => c.text() != "public",
        "static" => true,
        _ => false,
    });
    let private_name = member
        .field("name")
        .is_some_and(|n| n.kind().as_ref() == "private_property_identifier");
    !hidden && !private_name
}

fn property_name<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<String> {
    match node.kind().as_ref() {
        "computed_property_name" => None,
        "string" => Some(unquote(&node.text())),
        _ => Some(node.text().to_string()),
    }
}

// ── type expressions ───────────────────────────────────────────────

/// Lower a type expression node.
pub fn lower_type<D: ast_grep_core::Doc>(node: &Node<D>) -> TypeNode {
    let kind = node.kind();
    match kind.as_ref() {
        "type_annotation" | "parenthesized_type" | "readonly_type" | "default_type" => {
            first_named(node).map_or(TypeNode::Primitive(Primitive::Any), |t| lower_type(&t))
        }
        "predefined_type" => Primitive::from_keyword(node.text().trim())
            .map_or_else(|| unsupported(node), TypeNode::Primitive),
        "type_identifier" | "identifier" | "nested_type_identifier" => TypeNode::Reference {
            name: compact(&node.text()),
            args: Vec::new(),
        },
        "generic_type" => TypeNode::Reference {
            name: node
                .field("name")
                .map_or_else(String::new, |n| compact(&n.text())),
            args: node
                .field("type_arguments")
                .map(|a| named_children(&a).iter().map(lower_type).collect())
                .unwrap_or_default(),
        },
        "literal_type" => first_child(node).map_or_else(|| unsupported(node), |c| lower_literal(&c)),
        "string" | "number" | "true" | "false" | "null" | "undefined" | "unary_expression" => {
            lower_literal(node)
        }
        "union_type" => TypeNode::Union(flatten(node, |t| match t {
            TypeNode::Union(members) => Ok(members),
            other => Err(other),
        })),
        "intersection_type" => TypeNode::Intersection(flatten(node, |t| match t {
            TypeNode::Intersection(members) => Ok(members),
            other => Err(other),
        })),
        "array_type" => TypeNode::Array(Box::new(
            first_named(node).map_or(TypeNode::Primitive(Primitive::Any), |t| lower_type(&t)),
        )),
        "tuple_type" => lower_tuple(node),
        "object_type" => TypeNode::Object(lower_members(node)),
        "function_type" | "constructor_type" => TypeNode::Function(FunctionSignature {
            text: node.text().to_string(),
            constructor: kind.as_ref() == "constructor_type",
        }),
        "template_literal_type" => TypeNode::TemplateLiteral,
        _ => unsupported(node),
    }
}

fn lower_literal<D: ast_grep_core::Doc>(node: &Node<D>) -> TypeNode {
    match node.kind().as_ref() {
        "string" => TypeNode::Literal(Literal::String(unquote(&node.text()))),
        "number" | "unary_expression" => parse_number(&node.text())
            .map_or_else(|| unsupported(node), |n| TypeNode::Literal(Literal::Number(n))),
        "true" => TypeNode::Literal(Literal::Bool(true)),
        "false" => TypeNode::Literal(Literal::Bool(false)),
        "null" => TypeNode::Primitive(Primitive::Null),
        "undefined" => TypeNode::Primitive(Primitive::Undefined),
        _ => unsupported(node),
    }
}

fn lower_tuple<D: ast_grep_core::Doc>(node: &Node<D>) -> TypeNode {
    let mut tuple = TupleType {
        elements: Vec::new(),
        rest: None,
    };
    for element in named_children(node) {
        match element.kind().as_ref() {
            "optional_type" => tuple.elements.push(TupleElement {
                ty: first_named(&element)
                    .map_or(TypeNode::Primitive(Primitive::Any), |t| lower_type(&t)),
                optional: true,
            }),
            "rest_type" => {
                let inner =
                    first_named(&element).map_or(TypeNode::Primitive(Primitive::Any), |t| lower_type(&t));
                let item = match inner {
                    TypeNode::Array(item) => *item,
                    other => other,
                };
                tuple.rest = Some(Box::new(item));
            }
            "tuple_parameter" | "optional_tuple_parameter" => tuple.elements.push(TupleElement {
                ty: element
                    .field("type")
                    .map_or(TypeNode::Primitive(Primitive::Any), |t| lower_type(&t)),
                optional: element.kind().as_ref() == "optional_tuple_parameter",
            }),
            _ => tuple.elements.push(TupleElement {
                ty: lower_type(&element),
                optional: false,
            }),
        }
    }
    TypeNode::Tuple(tuple)
}

/// Collect the members of a left-nested binary type (`A | B | C`).
fn flatten<D: ast_grep_core::Doc>(
    node: &Node<D>,
    split: impl Fn(TypeNode) -> Result<Vec<TypeNode>, TypeNode> + Copy,
) -> Vec<TypeNode> {
    let mut members = Vec::new();
    for child in named_children(node) {
        match split(lower_type(&child)) {
            Ok(nested) => members.extend(nested),
            Err(single) => members.push(single),
        }
    }
    members
}

// ── helpers ────────────────────────────────────────────────────────

fn named_children<'r, D: ast_grep_core::Doc>(node: &Node<'r, D>) -> Vec<Node<'r, D>> {
    node.children()
        .filter(|c| c.is_named() && c.kind().as_ref() != "comment")
        .collect()
}

fn first_named<'r, D: ast_grep_core::Doc>(node: &Node<'r, D>) -> Option<Node<'r, D>> {
    node.children()
        .find(|c| c.is_named() && c.kind().as_ref() != "comment")
}

fn first_child<'r, D: ast_grep_core::Doc>(node: &Node<'r, D>) -> Option<Node<'r, D>> {
    node.children().find(|c| c.kind().as_ref() != "comment")
}

fn has_token<D: ast_grep_core::Doc>(node: &Node<D>, kind: &str) -> bool {
    node.children().any(|c| c.kind().as_ref() == kind)
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn unsupported<D: ast_grep_core::Doc>(node: &Node<D>) -> TypeNode {
    TypeNode::Unsupported {
        kind: node.kind().replace('_', " "),
        text: node.text().to_string(),
    }
}

fn parse_number(text: &str) -> Option<serde_json::Number> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace() && *c != '_').collect();
    let (negative, digits) = cleaned
        .strip_prefix('-')
        .map_or((false, cleaned.as_str()), |d| (true, d));

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok().map(serde_json::Number::from)
    } else if let Ok(int) = digits.parse::<i64>() {
        Some(serde_json::Number::from(int))
    } else {
        digits.parse::<f64>().ok().and_then(serde_json::Number::from_f64)
    }?;

    if !negative {
        return Some(magnitude);
    }
    magnitude.as_i64().map_or_else(
        || magnitude.as_f64().and_then(|f| serde_json::Number::from_f64(-f)),
        |i| Some(serde_json::Number::from(-i)),
    )
}
