use crate::cli::{GlobalFlags, PathArgs};
use crate::context::PipelineContext;
use crate::output::output;
use crate::pipeline;
use crate::progress::with_spinner;

/// Handle `tsval schemas`.
pub fn handle(args: &PathArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let ctx = PipelineContext::load(flags, args)?;
    let manifest = pipeline::load_manifest(&ctx)?;
    let report = with_spinner(
        "Building schemas",
        |r: &pipeline::BuildReport| format!("Schemas: {} written", r.built.len()),
        || pipeline::build_schemas(&ctx, &manifest),
    )?;
    output(&report, flags.format)
}
