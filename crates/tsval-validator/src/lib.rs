//! # tsval-validator
//!
//! Compiles schema documents into standalone validator modules.
//!
//! A document is meta-checked, lowered into a [`ValidatorProgram`] (a flat
//! table of keyword rules) and rendered as CommonJS. The same program can be
//! evaluated in-process, which is how `tsval check` and the tests observe the
//! exact behavior of the generated code.

pub mod backend;
pub mod compiler;
pub mod emit;
pub mod error;
pub mod eval;
pub mod lower;
pub mod program;
pub mod runtime;

pub use backend::{PortableModule, StandaloneBackend, ValidatorBackend};
pub use compiler::{
    CompileReport, CompiledValidator, FailedSchema, LoadedSchema, ValidatorCompiler,
    discover_schemas, load_schema,
};
pub use error::CompileError;
pub use lower::lower_schema;
pub use program::{ValidationError, ValidatorProgram};
