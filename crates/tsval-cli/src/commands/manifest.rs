use crate::cli::{GlobalFlags, PathArgs};
use crate::context::PipelineContext;
use crate::output::output;
use crate::pipeline;

/// Handle `tsval manifest`.
pub fn handle(args: &PathArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let ctx = PipelineContext::load(flags, args)?;
    let manifest = pipeline::load_manifest(&ctx)?;
    output(&manifest, flags.format)
}
