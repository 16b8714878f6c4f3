//! # tsval-parser
//!
//! ast-grep-based TypeScript front end for tsval.
//!
//! - **Manifest extraction**: re-export statements of the manifest file →
//!   [`tsval_core::Manifest`]
//! - **Type introspection**: named interfaces, aliases, enums and classes →
//!   JSON Schema definitions, resolved across imports and re-exports
//!
//! Types are read from declared syntax only; nothing is inferred.

pub mod error;
pub mod format;
pub mod graph;
pub mod introspect;
pub mod jsdoc;
pub mod lower;
pub mod manifest;
pub mod parser;
pub mod types;

pub use error::{IntrospectError, ParserError};
pub use format::{FormatOptions, SubTypeFormatter};
pub use introspect::{IntrospectConfig, IntrospectedSchema, SourceIntrospector, TypeIntrospector};
pub use manifest::{extract_manifest, find_manifest};
pub use types::TypeNode;
