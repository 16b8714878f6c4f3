use crate::cli::{GenerateArgs, GlobalFlags};
use crate::context::PipelineContext;
use crate::output::output;
use crate::pipeline;

/// Handle `tsval generate`.
pub fn handle(args: &GenerateArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut ctx = PipelineContext::load(flags, &args.paths)?;
    if args.rescan {
        ctx.config.pipeline.rescan_schema_dir = true;
    }
    if args.sequential {
        ctx.config.pipeline.parallel = false;
    }

    let report = pipeline::run(&ctx)?;
    if !report.failed_modules.is_empty() || !report.validators.failed_schemas.is_empty() {
        tracing::warn!(
            failed_modules = report.failed_modules.len(),
            failed_schemas = report.validators.failed_schemas.len(),
            "generation finished with skipped units"
        );
    }
    output(&report, flags.format)
}
