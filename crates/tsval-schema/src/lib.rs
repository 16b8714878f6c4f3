//! # tsval-schema
//!
//! Schema construction for tsval: one JSON Schema document per manifest
//! module.
//!
//! For every requested type the builder asks a
//! [`tsval_parser::TypeIntrospector`] for a schema, wraps it as a document
//! whose `anyOf` points at the type, folds the per-type documents with
//! [`tsval_core::SchemaDocument::merge`], and writes the result to
//! `<out_root>/generatedSchemas/<module>.schema.json`.
//!
//! Callable members are rendered by [`FunctionTypeFormatter`] as a fixed
//! `isFunction` marker object.

pub mod builder;
pub mod error;
pub mod formatter;

pub use builder::{BuiltSchema, SchemaBuilder};
pub use error::SchemaError;
pub use formatter::FunctionTypeFormatter;
