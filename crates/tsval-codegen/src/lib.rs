//! # tsval-codegen
//!
//! Aggregates compiled validators into one TypeScript module.
//!
//! Each validator module is imported under a short generated binding, and
//! every definition it declares (filtered by the schema's allow-list) gets
//! an exported `validate<Definition>` wrapper returning the error list.
//! Names shared between schemas are emitted once, first occurrence wins,
//! subject to the configured [`DuplicatePolicy`](tsval_core::DuplicatePolicy).

pub mod aggregate;
pub mod error;
pub mod ids;
pub mod ir;
pub mod printer;

pub use aggregate::{AggregateReport, Aggregator, SchemaInstance, SkippedDuplicate};
pub use error::CodegenError;
pub use ids::IdGenerator;
pub use ir::{GeneratedModule, ImportBinding, PublicFunction};
pub use printer::{Printer, TypeScriptPrinter};
