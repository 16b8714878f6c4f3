//! # tsval-core
//!
//! Core types, output layout, and error types for tsval.
//!
//! This crate provides the foundational types shared across all tsval crates:
//! - The manifest model (module path → requested type names)
//! - The typed schema tree with its deep-merge rule
//! - Schema documents and `$ref` helpers
//! - Policy enums shared by config and code generation
//! - Output layout (every generated path is derived here)
//! - File helpers, directory walking, and the cross-cutting error type

pub mod document;
pub mod enums;
pub mod errors;
pub mod fs;
pub mod layout;
pub mod manifest;
pub mod schema_node;
pub mod walk;

pub use document::{SchemaDocument, SchemaRef};
pub use enums::{DuplicatePolicy, IdStrategy};
pub use errors::CoreError;
pub use layout::OutputLayout;
pub use manifest::{Manifest, ManifestEntry, TypeSelection};
pub use schema_node::{ObjectNode, Scalar, SchemaNode};
