use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use tsval_validator::{CompiledValidator, ValidationError, ValidatorCompiler, load_schema};

use crate::cli::{CheckArgs, GlobalFlags};
use crate::context::PipelineContext;
use crate::output::output;
use crate::pipeline;

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub definition: String,
    pub schema: PathBuf,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Handle `tsval check`. Runs the same rules `validate<Definition>` runs,
/// in-process, and fails when the value does not match.
pub fn handle(args: &CheckArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let ctx = PipelineContext::load(flags, &args.paths)?;
    let text = std::fs::read_to_string(&args.data)
        .with_context(|| format!("failed to read {}", args.data.display()))?;
    let data: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.data.display()))?;

    let validator = find_validator(&ctx, &args.definition)?;
    let report = check(&validator, &args.definition, &data)?;
    output(&report, flags.format)?;

    if !report.valid {
        anyhow::bail!(
            "{} does not match {} ({} error(s))",
            args.data.display(),
            args.definition,
            report.errors.len()
        );
    }
    Ok(())
}

/// First schema on disk that emits a public function for `definition`.
fn find_validator(ctx: &PipelineContext, definition: &str) -> anyhow::Result<CompiledValidator> {
    let compiler = ValidatorCompiler::standalone();
    for path in pipeline::scan_schemas(ctx) {
        let loaded = match load_schema(&path, &ctx.layout) {
            Ok(loaded) => loaded,
            Err(error) => {
                tracing::warn!(schema = %path.display(), %error, "skipping unreadable schema");
                continue;
            }
        };
        if !loaded.refs.iter().any(|r| r == definition) || !loaded.document.is_exported(definition)
        {
            continue;
        }
        return compiler
            .compile(loaded)
            .with_context(|| format!("failed to compile {}", path.display()));
    }
    anyhow::bail!(
        "no schema in {} defines '{definition}'",
        ctx.layout.schemas_dir().display()
    )
}

/// Validate against `definition` alone, not the schema's root union.
fn check(
    validator: &CompiledValidator,
    definition: &str,
    data: &Value,
) -> anyhow::Result<CheckReport> {
    let errors = validator.validate(definition, data).with_context(|| {
        format!(
            "{} has no entry point for '{definition}'",
            validator.schema_path.display()
        )
    })?;
    Ok(CheckReport {
        definition: definition.to_string(),
        schema: validator.schema_path.clone(),
        valid: errors.is_empty(),
        errors,
    })
}
