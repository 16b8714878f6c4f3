use std::path::PathBuf;

use tsval_validator::CompileReport;

use crate::cli::{GlobalFlags, PathArgs};
use crate::context::PipelineContext;
use crate::output::output;
use crate::pipeline::{self, CompileSummary};
use crate::progress::with_spinner;

/// Handle `tsval compile`: every schema document on disk, no manifest.
pub fn handle(args: &PathArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let ctx = PipelineContext::load(flags, args)?;
    let schemas = pipeline::scan_schemas(&ctx);
    let (runtime, report) = with_spinner(
        "Compiling validators",
        |(_, r): &(PathBuf, CompileReport)| format!("Validators: {} compiled", r.compiled.len()),
        || pipeline::compile_validators(&ctx, &schemas),
    )?;
    output(&CompileSummary::new(runtime, &report), flags.format)
}
