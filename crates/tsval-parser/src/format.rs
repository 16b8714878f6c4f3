//! Type IR → JSON Schema definitions.
//!
//! Exported named types become entries under `definitions` and are
//! referenced with `$ref`; non-exported types are inlined at their use
//! sites. Custom [`SubTypeFormatter`]s are consulted before the built-in
//! rules for every type expression.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

use serde_json::{Value, json};
use tsval_core::{ObjectNode, SchemaNode, SchemaRef};

use crate::error::IntrospectError;
use crate::graph::{Lookup, Resolved, SourceGraph};
use crate::types::{
    Annotations, DeclKind, EnumMember, Literal, ModuleDecls, ObjectType, Primitive, TupleType,
    TypeNode,
};

/// Nesting limit for shape resolution through aliases and `extends`.
const MAX_SHAPE_DEPTH: usize = 64;

/// Hook that takes over formatting for the type expressions it supports.
pub trait SubTypeFormatter: Send + Sync {
    fn supports(&self, ty: &TypeNode) -> bool;
    fn format(&self, ty: &TypeNode) -> SchemaNode;
}

#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    pub additional_properties: bool,
    pub encode_refs: bool,
}

#[derive(Debug, Clone)]
struct Scope {
    module: Rc<ModuleDecls>,
    params: Rc<HashMap<String, Binding>>,
}

#[derive(Debug, Clone)]
struct Binding {
    ty: TypeNode,
    scope: Scope,
}

impl Scope {
    fn root(module: Rc<ModuleDecls>) -> Self {
        Self {
            module,
            params: Rc::new(HashMap::new()),
        }
    }

    fn param(&self, name: &str) -> Option<&Binding> {
        self.params.get(name)
    }
}

#[derive(Debug, Clone)]
struct ShapeProperty {
    name: String,
    ty: TypeNode,
    optional: bool,
    annotations: Annotations,
    scope: Scope,
}

/// Flattened object members, each carrying the scope it was declared in.
#[derive(Debug, Clone, Default)]
struct Shape {
    properties: Vec<ShapeProperty>,
    index: Option<(TypeNode, Scope)>,
}

impl Shape {
    fn from_object(object: &ObjectType, scope: &Scope) -> Self {
        Self {
            properties: object
                .properties
                .iter()
                .map(|p| ShapeProperty {
                    name: p.name.clone(),
                    ty: p.ty.clone(),
                    optional: p.optional,
                    annotations: p.annotations.clone(),
                    scope: scope.clone(),
                })
                .collect(),
            index: object
                .index
                .as_ref()
                .map(|ty| ((**ty).clone(), scope.clone())),
        }
    }

    /// Later members override earlier ones in place.
    fn extend(&mut self, later: Self) {
        for property in later.properties {
            match self.properties.iter_mut().find(|p| p.name == property.name) {
                Some(slot) => *slot = property,
                None => self.properties.push(property),
            }
        }
        if later.index.is_some() {
            self.index = later.index;
        }
    }
}

/// Formats declarations reachable from one root module.
pub struct SchemaFormatter<'a> {
    graph: &'a SourceGraph,
    options: FormatOptions,
    custom: &'a [Box<dyn SubTypeFormatter>],
    definitions: ObjectNode,
    in_progress: HashSet<String>,
    inlining: Vec<(PathBuf, String)>,
    depth: usize,
}

impl<'a> SchemaFormatter<'a> {
    #[must_use]
    pub fn new(
        graph: &'a SourceGraph,
        options: FormatOptions,
        custom: &'a [Box<dyn SubTypeFormatter>],
    ) -> Self {
        Self {
            graph,
            options,
            custom,
            definitions: ObjectNode::new(),
            in_progress: HashSet::new(),
            inlining: Vec::new(),
            depth: 0,
        }
    }

    /// Emit a definition for `name` as seen from `module` and return the
    /// definition name.
    ///
    /// # Errors
    /// `TypeNotFound` when the name does not resolve; any formatting error
    /// of the type or the types it references.
    pub fn define_root(
        &mut self,
        module: &Rc<ModuleDecls>,
        name: &str,
    ) -> Result<String, IntrospectError> {
        let scope = Scope::root(Rc::clone(module));
        let Lookup::Declaration(resolved) = self.graph.lookup(module, name)? else {
            return Err(IntrospectError::TypeNotFound {
                name: name.to_string(),
                module: module.path.clone(),
            });
        };
        let decl_scope = self.instantiate(&resolved, &[], &scope)?;
        let def_name = self.definition_name(&resolved, &[], &scope);
        self.define(&resolved, &decl_scope, &def_name)?;
        Ok(def_name)
    }

    /// Whether every type parameter of the declaration has a default.
    #[must_use]
    pub fn is_concrete(resolved: &Resolved) -> bool {
        resolved
            .declaration()
            .type_params
            .iter()
            .all(|p| p.default.is_some())
    }

    #[must_use]
    pub fn into_definitions(self) -> ObjectNode {
        self.definitions
    }

    // ── definitions ────────────────────────────────────────────────

    fn define(
        &mut self,
        resolved: &Resolved,
        scope: &Scope,
        def_name: &str,
    ) -> Result<(), IntrospectError> {
        if self.definitions.contains_key(def_name) || self.in_progress.contains(def_name) {
            return Ok(());
        }
        // Placeholder keeps referrers ahead of the types they reference.
        self.definitions
            .insert(def_name, SchemaNode::Object(ObjectNode::new()));
        self.in_progress.insert(def_name.to_string());

        let body = self.format_declaration(resolved, scope)?;

        self.in_progress.remove(def_name);
        self.definitions.insert(def_name, body);
        Ok(())
    }

    fn format_declaration(
        &mut self,
        resolved: &Resolved,
        scope: &Scope,
    ) -> Result<SchemaNode, IntrospectError> {
        let decl = resolved.declaration();
        let schema = match &decl.kind {
            DeclKind::Interface { .. } | DeclKind::Class { .. } => {
                let shape = self.declaration_shape(resolved, scope)?;
                self.object_schema(shape)?
            }
            DeclKind::Alias(value) => self.format_type(value, scope)?,
            DeclKind::Enum(members) => enum_schema(members, &resolved.module)?,
        };
        Ok(annotate(schema, &decl.annotations))
    }

    /// Bind a declaration's type parameters to `args` (formatted in
    /// `caller`) or to their defaults.
    fn instantiate(
        &self,
        resolved: &Resolved,
        args: &[TypeNode],
        caller: &Scope,
    ) -> Result<Scope, IntrospectError> {
        let decl = resolved.declaration();
        if args.len() > decl.type_params.len() {
            return Err(arity_error(resolved, args.len()));
        }

        let mut params = HashMap::new();
        for (i, param) in decl.type_params.iter().enumerate() {
            let binding = match (args.get(i), &param.default) {
                (Some(arg), _) => Binding {
                    ty: arg.clone(),
                    scope: caller.clone(),
                },
                (None, Some(default)) => Binding {
                    ty: default.clone(),
                    scope: Scope {
                        module: Rc::clone(&resolved.module),
                        params: Rc::new(params.clone()),
                    },
                },
                (None, None) => return Err(arity_error(resolved, args.len())),
            };
            params.insert(param.name.clone(), binding);
        }

        Ok(Scope {
            module: Rc::clone(&resolved.module),
            params: Rc::new(params),
        })
    }

    /// `Name` or `Name<Arg,...>` with type parameters substituted.
    fn definition_name(&self, resolved: &Resolved, args: &[TypeNode], caller: &Scope) -> String {
        let decl = resolved.declaration();
        if decl.type_params.is_empty() {
            return decl.name.clone();
        }
        let shown: Vec<String> = decl
            .type_params
            .iter()
            .enumerate()
            .map(|(i, param)| match (args.get(i), &param.default) {
                (Some(arg), _) => substitute(arg, caller).to_string(),
                (None, Some(default)) => default.to_string(),
                (None, None) => param.name.clone(),
            })
            .collect();
        format!("{}<{}>", decl.name, shown.join(","))
    }

    // ── type expressions ───────────────────────────────────────────

    fn format_type(&mut self, ty: &TypeNode, scope: &Scope) -> Result<SchemaNode, IntrospectError> {
        if let Some(formatter) = self.custom.iter().find(|f| f.supports(ty)) {
            return Ok(formatter.format(ty));
        }

        match ty {
            TypeNode::Primitive(primitive) => primitive_schema(*primitive, &scope.module),
            TypeNode::Literal(literal) => Ok(literal_schema(literal)),
            TypeNode::Reference { name, args } => self.reference_schema(name, args, scope),
            TypeNode::Array(item) => Ok(SchemaNode::object([
                ("type", SchemaNode::string("array")),
                ("items", self.format_type(item, scope)?),
            ])),
            TypeNode::Tuple(tuple) => self.tuple_schema(tuple, scope),
            TypeNode::Object(object) => self.object_schema(Shape::from_object(object, scope)),
            TypeNode::Union(members) => self.union_schema(members, scope),
            TypeNode::Intersection(parts) => match self.resolve_shape(ty, scope)? {
                Some(shape) => self.object_schema(shape),
                None => {
                    let all_of = parts
                        .iter()
                        .map(|p| self.format_type(p, scope))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(SchemaNode::object([("allOf", SchemaNode::Array(all_of))]))
                }
            },
            TypeNode::Function(signature) => Err(IntrospectError::UnsupportedType {
                kind: if signature.constructor {
                    "constructor".into()
                } else {
                    "function".into()
                },
                text: signature.text.clone(),
                module: scope.module.path.clone(),
            }),
            TypeNode::TemplateLiteral => Ok(type_schema("string")),
            TypeNode::Unsupported { kind, text } => Err(IntrospectError::UnsupportedType {
                kind: kind.clone(),
                text: text.clone(),
                module: scope.module.path.clone(),
            }),
        }
    }

    fn reference_schema(
        &mut self,
        name: &str,
        args: &[TypeNode],
        scope: &Scope,
    ) -> Result<SchemaNode, IntrospectError> {
        if args.is_empty()
            && let Some(binding) = scope.param(name)
        {
            let binding = binding.clone();
            return self.format_type(&binding.ty, &binding.scope);
        }

        if let Some(literal) = self.enum_member(name, scope)? {
            return Ok(literal_schema(&literal));
        }

        match self.graph.lookup(&scope.module, name)? {
            Lookup::Declaration(resolved) => {
                let decl_scope = self.instantiate(&resolved, args, scope)?;
                if resolved.declaration().exported {
                    let def_name = self.definition_name(&resolved, args, scope);
                    self.define(&resolved, &decl_scope, &def_name)?;
                    Ok(ref_schema(&def_name, self.options.encode_refs))
                } else {
                    self.inline(&resolved, &decl_scope)
                }
            }
            Lookup::Namespace(_) => Err(IntrospectError::UnsupportedType {
                kind: "namespace".into(),
                text: name.to_string(),
                module: scope.module.path.clone(),
            }),
            Lookup::NotFound => match self.builtin_schema(name, args, scope)? {
                Some(schema) => Ok(schema),
                None => Err(IntrospectError::TypeNotFound {
                    name: name.to_string(),
                    module: scope.module.path.clone(),
                }),
            },
        }
    }

    fn inline(&mut self, resolved: &Resolved, scope: &Scope) -> Result<SchemaNode, IntrospectError> {
        let key = (
            resolved.module.path.clone(),
            resolved.declaration().name.clone(),
        );
        if self.inlining.contains(&key) {
            return Err(IntrospectError::UnsupportedType {
                kind: "recursive non-exported".into(),
                text: key.1,
                module: key.0,
            });
        }
        self.inlining.push(key);
        let result = self.format_declaration(resolved, scope);
        self.inlining.pop();
        result
    }

    /// `Color.Red` where `Color` is an enum.
    fn enum_member(&self, name: &str, scope: &Scope) -> Result<Option<Literal>, IntrospectError> {
        let Some((owner, member)) = name.rsplit_once('.') else {
            return Ok(None);
        };
        let Lookup::Declaration(resolved) = self.graph.lookup(&scope.module, owner)? else {
            return Ok(None);
        };
        let DeclKind::Enum(members) = &resolved.declaration().kind else {
            return Ok(None);
        };
        Ok(members
            .iter()
            .find(|m| m.name == member)
            .and_then(|m| m.value.clone()))
    }

    fn builtin_schema(
        &mut self,
        name: &str,
        args: &[TypeNode],
        scope: &Scope,
    ) -> Result<Option<SchemaNode>, IntrospectError> {
        let schema = match (name, args) {
            ("Date", []) => SchemaNode::from(json!({ "type": "string", "format": "date-time" })),
            ("String", []) => type_schema("string"),
            ("Number", []) => type_schema("number"),
            ("Boolean", []) => type_schema("boolean"),
            ("Object", []) => type_schema("object"),
            ("Array" | "ReadonlyArray", [item]) => SchemaNode::object([
                ("type", SchemaNode::string("array")),
                ("items", self.format_type(item, scope)?),
            ]),
            ("Record", [key, value]) => {
                if literal_keys(key, scope).is_some() {
                    let ty = TypeNode::Reference {
                        name: name.to_string(),
                        args: args.to_vec(),
                    };
                    return self.shape_schema(&ty, scope).map(Some);
                }
                SchemaNode::object([
                    ("type", SchemaNode::string("object")),
                    ("additionalProperties", self.format_type(value, scope)?),
                ])
            }
            ("Partial" | "Required" | "Readonly" | "Pick" | "Omit", _) => {
                let ty = TypeNode::Reference {
                    name: name.to_string(),
                    args: args.to_vec(),
                };
                return self.shape_schema(&ty, scope).map(Some);
            }
            _ => return Ok(None),
        };
        Ok(Some(schema))
    }

    fn shape_schema(&mut self, ty: &TypeNode, scope: &Scope) -> Result<SchemaNode, IntrospectError> {
        match self.resolve_shape(ty, scope)? {
            Some(shape) => self.object_schema(shape),
            None => Err(IntrospectError::UnsupportedType {
                kind: "non-object utility".into(),
                text: substitute(ty, scope).to_string(),
                module: scope.module.path.clone(),
            }),
        }
    }

    fn tuple_schema(&mut self, tuple: &TupleType, scope: &Scope) -> Result<SchemaNode, IntrospectError> {
        let items = tuple
            .elements
            .iter()
            .map(|e| self.format_type(&e.ty, scope))
            .collect::<Result<Vec<_>, _>>()?;
        let min_items = tuple.elements.iter().filter(|e| !e.optional).count();

        let mut schema = ObjectNode::new();
        schema.insert("type", SchemaNode::string("array"));
        if !items.is_empty() {
            schema.insert("items", SchemaNode::Array(items));
        }
        schema.insert("minItems", SchemaNode::from(json!(min_items)));
        match &tuple.rest {
            Some(rest) => {
                schema.insert("additionalItems", self.format_type(rest, scope)?);
            }
            None => {
                schema.insert("maxItems", SchemaNode::from(json!(tuple.elements.len())));
            }
        }
        Ok(SchemaNode::Object(schema))
    }

    fn union_schema(&mut self, members: &[TypeNode], scope: &Scope) -> Result<SchemaNode, IntrospectError> {
        let defined: Vec<&TypeNode> = members.iter().filter(|m| !is_undefined(m)).collect();
        if defined.is_empty() {
            return primitive_schema(Primitive::Undefined, &scope.module);
        }

        let formatted = defined
            .iter()
            .map(|m| self.format_type(m, scope))
            .collect::<Result<Vec<_>, _>>()?;
        if let [single] = formatted.as_slice() {
            return Ok(single.clone());
        }
        Ok(collapse_union(formatted))
    }

    // ── object shapes ──────────────────────────────────────────────

    fn declaration_shape(&mut self, resolved: &Resolved, scope: &Scope) -> Result<Shape, IntrospectError> {
        let (bases, body): (Vec<&TypeNode>, &ObjectType) = match &resolved.declaration().kind {
            DeclKind::Interface { extends, body } => (extends.iter().collect(), body),
            DeclKind::Class { extends, body } => (extends.iter().collect(), body),
            _ => return Ok(Shape::default()),
        };

        let mut shape = Shape::default();
        for base in bases {
            // Exported bases also get their own definition.
            if let TypeNode::Reference { name, .. } = base
                && let Lookup::Declaration(base_decl) = self.graph.lookup(&scope.module, name)?
                && base_decl.declaration().exported
            {
                self.format_type(base, scope)?;
            }
            let Some(base_shape) = self.resolve_shape(base, scope)? else {
                return Err(IntrospectError::UnsupportedType {
                    kind: "base".into(),
                    text: substitute(base, scope).to_string(),
                    module: scope.module.path.clone(),
                });
            };
            shape.extend(base_shape);
        }
        shape.extend(Shape::from_object(body, scope));
        Ok(shape)
    }

    fn resolve_shape(&mut self, ty: &TypeNode, scope: &Scope) -> Result<Option<Shape>, IntrospectError> {
        if self.depth >= MAX_SHAPE_DEPTH {
            return Err(IntrospectError::UnsupportedType {
                kind: "deeply nested".into(),
                text: ty.to_string(),
                module: scope.module.path.clone(),
            });
        }
        self.depth += 1;
        let result = self.resolve_shape_inner(ty, scope);
        self.depth -= 1;
        result
    }

    fn resolve_shape_inner(&mut self, ty: &TypeNode, scope: &Scope) -> Result<Option<Shape>, IntrospectError> {
        match ty {
            TypeNode::Object(object) => Ok(Some(Shape::from_object(object, scope))),
            TypeNode::Intersection(parts) => {
                let mut merged = Shape::default();
                for part in parts {
                    let Some(shape) = self.resolve_shape(part, scope)? else {
                        return Ok(None);
                    };
                    merged.extend(shape);
                }
                Ok(Some(merged))
            }
            TypeNode::Reference { name, args } => {
                if args.is_empty()
                    && let Some(binding) = scope.param(name)
                {
                    let binding = binding.clone();
                    return self.resolve_shape(&binding.ty, &binding.scope);
                }
                match self.graph.lookup(&scope.module, name)? {
                    Lookup::Declaration(resolved) => {
                        let decl_scope = self.instantiate(&resolved, args, scope)?;
                        match &resolved.declaration().kind {
                            DeclKind::Interface { .. } | DeclKind::Class { .. } => {
                                self.declaration_shape(&resolved, &decl_scope).map(Some)
                            }
                            DeclKind::Alias(value) => {
                                let value = value.clone();
                                self.resolve_shape(&value, &decl_scope)
                            }
                            DeclKind::Enum(_) => Ok(None),
                        }
                    }
                    Lookup::Namespace(_) => Ok(None),
                    Lookup::NotFound => self.utility_shape(name, args, scope),
                }
            }
            _ => Ok(None),
        }
    }

    fn utility_shape(
        &mut self,
        name: &str,
        args: &[TypeNode],
        scope: &Scope,
    ) -> Result<Option<Shape>, IntrospectError> {
        match (name, args) {
            ("Readonly", [inner]) => self.resolve_shape(inner, scope),
            ("Partial" | "Required", [inner]) => {
                let optional = name == "Partial";
                Ok(self.resolve_shape(inner, scope)?.map(|mut shape| {
                    for property in &mut shape.properties {
                        property.optional = optional;
                    }
                    shape
                }))
            }
            ("Pick" | "Omit", [inner, keys]) => {
                let Some(keys) = literal_keys(keys, scope) else {
                    return Ok(None);
                };
                let keep = name == "Pick";
                Ok(self.resolve_shape(inner, scope)?.map(|mut shape| {
                    shape
                        .properties
                        .retain(|p| keys.contains(&p.name) == keep);
                    shape
                }))
            }
            ("Record", [keys, value]) => Ok(literal_keys(keys, scope).map(|keys| Shape {
                properties: keys
                    .into_iter()
                    .map(|name| ShapeProperty {
                        name,
                        ty: value.clone(),
                        optional: false,
                        annotations: Annotations::default(),
                        scope: scope.clone(),
                    })
                    .collect(),
                index: None,
            })),
            _ => Ok(None),
        }
    }

    fn object_schema(&mut self, shape: Shape) -> Result<SchemaNode, IntrospectError> {
        let mut properties = ObjectNode::new();
        let mut required = Vec::new();

        for property in shape.properties {
            let (ty, had_undefined) = strip_undefined(&property.ty);
            let Some(ty) = ty else {
                continue;
            };
            let schema = self.format_type(&ty, &property.scope)?;
            properties.insert(property.name.clone(), annotate(schema, &property.annotations));
            if !(property.optional || had_undefined) {
                required.push(SchemaNode::string(property.name));
            }
        }

        let mut schema = ObjectNode::new();
        schema.insert("type", SchemaNode::string("object"));
        if !properties.is_empty() {
            schema.insert("properties", SchemaNode::Object(properties));
        }
        if !required.is_empty() {
            schema.insert("required", SchemaNode::Array(required));
        }
        if let Some((index, scope)) = shape.index {
            schema.insert("additionalProperties", self.format_type(&index, &scope)?);
        } else if !self.options.additional_properties {
            schema.insert("additionalProperties", SchemaNode::bool(false));
        }
        Ok(SchemaNode::Object(schema))
    }
}

// ── free helpers ───────────────────────────────────────────────────

fn arity_error(resolved: &Resolved, found: usize) -> IntrospectError {
    let decl = resolved.declaration();
    IntrospectError::TypeArguments {
        name: decl.name.clone(),
        expected: decl.type_params.len(),
        found,
    }
}

fn type_schema(json_type: &str) -> SchemaNode {
    SchemaNode::object([("type", SchemaNode::string(json_type))])
}

fn ref_schema(def_name: &str, encode: bool) -> SchemaNode {
    let reference = SchemaRef::to_definition(def_name, encode);
    SchemaNode::object([("$ref", SchemaNode::string(reference.pointer))])
}

fn primitive_schema(primitive: Primitive, module: &ModuleDecls) -> Result<SchemaNode, IntrospectError> {
    Ok(match primitive {
        Primitive::String => type_schema("string"),
        Primitive::Number => type_schema("number"),
        Primitive::Boolean => type_schema("boolean"),
        Primitive::Null => type_schema("null"),
        Primitive::Object => type_schema("object"),
        Primitive::BigInt => type_schema("integer"),
        Primitive::Any | Primitive::Unknown => SchemaNode::Object(ObjectNode::new()),
        Primitive::Never | Primitive::Undefined | Primitive::Void => {
            SchemaNode::from(json!({ "not": {} }))
        }
        Primitive::Symbol => {
            return Err(IntrospectError::UnsupportedType {
                kind: "symbol".into(),
                text: "symbol".into(),
                module: module.path.clone(),
            });
        }
    })
}

fn literal_schema(literal: &Literal) -> SchemaNode {
    SchemaNode::object([
        ("type", SchemaNode::string(literal.json_type())),
        ("const", SchemaNode::from(literal.to_value())),
    ])
}

fn enum_schema(members: &[EnumMember], module: &ModuleDecls) -> Result<SchemaNode, IntrospectError> {
    let mut values = Vec::with_capacity(members.len());
    let mut types: Vec<&'static str> = Vec::new();
    for member in members {
        let Some(value) = &member.value else {
            return Err(IntrospectError::UnsupportedType {
                kind: "computed enum member".into(),
                text: member.name.clone(),
                module: module.path.clone(),
            });
        };
        if !types.contains(&value.json_type()) {
            types.push(value.json_type());
        }
        values.push(value.to_value());
    }
    Ok(SchemaNode::from(json!({
        "type": type_keyword(&types),
        "enum": values,
    })))
}

fn type_keyword(types: &[&str]) -> Value {
    match types {
        [single] => Value::String((*single).to_string()),
        many => Value::Array(many.iter().map(|t| Value::String((*t).to_string())).collect()),
    }
}

/// Literal-only unions become `enum`, bare-type unions a `type` array,
/// anything else `anyOf`.
fn collapse_union(formatted: Vec<SchemaNode>) -> SchemaNode {
    let as_literal = |node: &SchemaNode| -> Option<(String, Value)> {
        let object = node.as_object()?;
        let json_type = object.get("type")?.as_str()?.to_string();
        match (object.len(), object.get("const")) {
            (2, Some(value)) => Some((json_type, value.to_value())),
            (1, None) if json_type == "null" => Some((json_type, Value::Null)),
            _ => None,
        }
    };
    let as_bare_type = |node: &SchemaNode| -> Option<String> {
        let object = node.as_object()?;
        (object.len() == 1)
            .then(|| object.get("type")?.as_str().map(str::to_string))
            .flatten()
    };

    if let Some(literals) = formatted.iter().map(as_literal).collect::<Option<Vec<_>>>() {
        let mut types: Vec<&str> = Vec::new();
        for (json_type, _) in &literals {
            if !types.contains(&json_type.as_str()) {
                types.push(json_type);
            }
        }
        let values: Vec<Value> = literals.iter().map(|(_, v)| v.clone()).collect();
        return SchemaNode::from(json!({ "type": type_keyword(&types), "enum": values }));
    }

    if let Some(bare) = formatted.iter().map(as_bare_type).collect::<Option<Vec<_>>>() {
        let mut types: Vec<&str> = Vec::new();
        for json_type in &bare {
            if !types.contains(&json_type.as_str()) {
                types.push(json_type);
            }
        }
        return SchemaNode::from(json!({ "type": type_keyword(&types) }));
    }

    SchemaNode::object([("anyOf", SchemaNode::Array(formatted))])
}

fn annotate(schema: SchemaNode, annotations: &Annotations) -> SchemaNode {
    match schema {
        SchemaNode::Object(mut object) if !annotations.is_empty() => {
            if let Some(description) = &annotations.description {
                object.insert("description", SchemaNode::string(description.clone()));
            }
            for (keyword, value) in &annotations.keywords {
                object.insert(keyword.clone(), SchemaNode::from(value.clone()));
            }
            SchemaNode::Object(object)
        }
        other => other,
    }
}

fn is_undefined(ty: &TypeNode) -> bool {
    matches!(
        ty,
        TypeNode::Primitive(Primitive::Undefined | Primitive::Void)
    )
}

/// Drop `undefined` from a property type; the flag reports whether any was
/// removed (the property then becomes optional).
fn strip_undefined(ty: &TypeNode) -> (Option<TypeNode>, bool) {
    match ty {
        TypeNode::Union(members) => {
            let kept: Vec<TypeNode> = members.iter().filter(|m| !is_undefined(m)).cloned().collect();
            let removed = kept.len() != members.len();
            match kept.len() {
                0 => (None, true),
                1 => (kept.into_iter().next(), removed),
                _ => (Some(TypeNode::Union(kept)), removed),
            }
        }
        other if is_undefined(other) => (None, true),
        other => (Some(other.clone()), false),
    }
}

/// String keys named by a literal or a union of literals.
fn literal_keys(ty: &TypeNode, scope: &Scope) -> Option<Vec<String>> {
    match ty {
        TypeNode::Literal(Literal::String(key)) => Some(vec![key.clone()]),
        TypeNode::Literal(Literal::Number(n)) => Some(vec![n.to_string()]),
        TypeNode::Union(members) => {
            let mut keys = Vec::new();
            for member in members {
                keys.extend(literal_keys(member, scope)?);
            }
            Some(keys)
        }
        TypeNode::Reference { name, args } if args.is_empty() => {
            let binding = scope.param(name)?;
            literal_keys(&binding.ty, &binding.scope)
        }
        _ => None,
    }
}

/// Replace bound type parameters for display.
fn substitute(ty: &TypeNode, scope: &Scope) -> TypeNode {
    match ty {
        TypeNode::Reference { name, args } if args.is_empty() => scope
            .param(name)
            .map_or_else(|| ty.clone(), |b| substitute(&b.ty, &b.scope)),
        TypeNode::Reference { name, args } => TypeNode::Reference {
            name: name.clone(),
            args: args.iter().map(|a| substitute(a, scope)).collect(),
        },
        TypeNode::Array(item) => TypeNode::Array(Box::new(substitute(item, scope))),
        TypeNode::Union(members) => {
            TypeNode::Union(members.iter().map(|m| substitute(m, scope)).collect())
        }
        TypeNode::Intersection(members) => {
            TypeNode::Intersection(members.iter().map(|m| substitute(m, scope)).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn node(value: Value) -> SchemaNode {
        SchemaNode::from(value)
    }

    #[test]
    fn string_literal_union_collapses_to_enum() {
        let collapsed = collapse_union(vec![
            node(json!({ "type": "string", "const": "a" })),
            node(json!({ "type": "string", "const": "b" })),
            node(json!({ "type": "null" })),
        ]);
        assert_eq!(
            collapsed.to_value(),
            json!({ "type": ["string", "null"], "enum": ["a", "b", null] })
        );
    }

    #[test]
    fn bare_type_union_collapses_to_type_array() {
        let collapsed = collapse_union(vec![
            node(json!({ "type": "string" })),
            node(json!({ "type": "number" })),
        ]);
        assert_eq!(collapsed.to_value(), json!({ "type": ["string", "number"] }));
    }

    #[test]
    fn mixed_union_uses_any_of() {
        let collapsed = collapse_union(vec![
            node(json!({ "type": "string" })),
            node(json!({ "$ref": "#/definitions/User" })),
        ]);
        assert_eq!(
            collapsed.to_value(),
            json!({ "anyOf": [{ "type": "string" }, { "$ref": "#/definitions/User" }] })
        );
    }

    #[test]
    fn strip_undefined_marks_optional() {
        let ty = TypeNode::Union(vec![
            TypeNode::Primitive(Primitive::String),
            TypeNode::Primitive(Primitive::Undefined),
        ]);
        assert_eq!(
            strip_undefined(&ty),
            (Some(TypeNode::Primitive(Primitive::String)), true)
        );
        assert_eq!(
            strip_undefined(&TypeNode::Primitive(Primitive::Undefined)),
            (None, true)
        );
    }

    #[test]
    fn annotations_land_on_object_schemas() {
        let annotated = annotate(
            type_schema("number"),
            &Annotations {
                description: Some("Age in years".into()),
                keywords: vec![("minimum".into(), json!(0))],
            },
        );
        assert_eq!(
            annotated.to_value(),
            json!({ "type": "number", "description": "Age in years", "minimum": 0 })
        );
    }
}
