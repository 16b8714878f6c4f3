//! Staged run: manifest → schemas → validators → aggregated module.
//!
//! Stages run strictly in order. Within the build and compile stages units
//! are independent and may run on the rayon pool; results are always
//! collected in input order so batch order (and therefore which validator
//! owns a shared definition name) matches manifest declaration order.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use serde::Serialize;
use tsval_codegen::{AggregateReport, Aggregator};
use tsval_core::{Manifest, ManifestEntry};
use tsval_parser::{extract_manifest, find_manifest};
use tsval_schema::{BuiltSchema, SchemaBuilder, SchemaError};
use tsval_validator::{
    CompileReport, CompiledValidator, FailedSchema, ValidatorCompiler, discover_schemas,
};

use crate::context::PipelineContext;
use crate::progress::with_spinner;

/// A manifest module whose schema could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedModule {
    pub module: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    pub built: Vec<BuiltSchema>,
    pub failed_modules: Vec<FailedModule>,
}

impl BuildReport {
    /// Schema paths in build order, each once.
    #[must_use]
    pub fn schema_paths(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.built
            .iter()
            .map(|b| b.schema_path.clone())
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }
}

/// One written validator module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledSummary {
    pub schema: PathBuf,
    pub module: PathBuf,
    pub definitions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CompileSummary {
    pub runtime: PathBuf,
    pub compiled: Vec<CompiledSummary>,
    pub failed_schemas: Vec<FailedSchema>,
}

impl CompileSummary {
    #[must_use]
    pub fn new(runtime: PathBuf, report: &CompileReport) -> Self {
        Self {
            runtime,
            compiled: report
                .compiled
                .iter()
                .map(|c| CompiledSummary {
                    schema: c.schema_path.clone(),
                    module: c.module_path.clone(),
                    definitions: c.refs.clone(),
                })
                .collect(),
            failed_schemas: report.failed.clone(),
        }
    }
}

/// Everything a full run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub manifest: PathBuf,
    pub modules: usize,
    pub schemas: Vec<PathBuf>,
    pub validators: CompileSummary,
    pub aggregated: AggregateReport,
    pub failed_modules: Vec<FailedModule>,
}

/// Apply `f` to every item, in parallel when asked, keeping input order.
fn map_units<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

/// Locate and parse the manifest.
pub fn load_manifest(ctx: &PipelineContext) -> anyhow::Result<Manifest> {
    let path = find_manifest(&ctx.paths.source_root, &ctx.paths.manifest_name)
        .context("failed to locate the manifest")?;
    let manifest = extract_manifest(&path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    tracing::info!(path = %path.display(), modules = manifest.len(), "manifest loaded");
    Ok(manifest)
}

/// A manifest entry's build step, decided before any file is written.
enum BuildUnit<'a> {
    Build(&'a ManifestEntry),
    /// Its schema file is already claimed by an earlier entry.
    Collides(String),
}

/// Schema files are named after the module's base name, so `./a/types`
/// and `./b/types` share one path. The first entry in manifest order keeps
/// it; later ones are reported instead of silently overwriting it.
fn plan_builds<'a>(
    entries: &'a [ManifestEntry],
    base_dir: &Path,
    ctx: &PipelineContext,
) -> Vec<BuildUnit<'a>> {
    let mut claimed: HashMap<PathBuf, &str> = HashMap::new();
    entries
        .iter()
        .map(|entry| {
            let path = SchemaBuilder::resolve_module(base_dir, &entry.module)
                .ok()
                .and_then(|source| ctx.layout.schema_path_for_module(&source).ok());
            let Some(path) = path else {
                // Unresolvable modules fail in the build step itself.
                return BuildUnit::Build(entry);
            };
            match claimed.get(&path) {
                Some(first) => BuildUnit::Collides(
                    SchemaError::OutputCollision {
                        module: entry.module.clone(),
                        first: (*first).to_string(),
                        path,
                    }
                    .to_string(),
                ),
                None => {
                    claimed.insert(path, &entry.module);
                    BuildUnit::Build(entry)
                }
            }
        })
        .collect()
}

/// Build and persist one schema document per manifest entry. Failing
/// modules are logged and reported; the others are still written.
pub fn build_schemas(ctx: &PipelineContext, manifest: &Manifest) -> anyhow::Result<BuildReport> {
    ctx.layout
        .ensure_dirs()
        .context("failed to create output directories")?;

    let tsconfig = Some(ctx.paths.tsconfig.clone()).filter(|p| p.is_file());
    let builder = SchemaBuilder::with_source_introspector(ctx.config.schema.clone(), tsconfig);
    let base_dir = manifest.base_dir();

    let units = plan_builds(&manifest.entries, base_dir, ctx);
    let results = map_units(&units, ctx.config.pipeline.parallel, |unit| match unit {
        BuildUnit::Build(entry) => builder
            .build(entry, base_dir, &ctx.layout)
            .map_err(|e| e.to_string()),
        BuildUnit::Collides(error) => Err(error.clone()),
    });

    let mut report = BuildReport::default();
    for (entry, result) in manifest.entries.iter().zip(results) {
        match result {
            Ok(built) => report.built.push(built),
            Err(error) => {
                tracing::warn!(module = %entry.module, %error, "skipping module");
                report.failed_modules.push(FailedModule {
                    module: entry.module.clone(),
                    error,
                });
            }
        }
    }
    Ok(report)
}

/// Compile the given schema files and write the runtime helper module.
pub fn compile_validators(
    ctx: &PipelineContext,
    schema_paths: &[PathBuf],
) -> anyhow::Result<(PathBuf, CompileReport)> {
    let runtime = ValidatorCompiler::write_runtime(&ctx.layout)
        .context("failed to write the validator runtime module")?;
    let compiler = ValidatorCompiler::standalone();

    let results = map_units(schema_paths, ctx.config.pipeline.parallel, |path| {
        compiler.compile_path(path, &ctx.layout)
    });

    let mut report = CompileReport::default();
    for (path, result) in schema_paths.iter().zip(results) {
        report.record(path, result);
    }
    Ok((runtime, report))
}

/// Write the aggregated module for the compiled validators.
pub fn aggregate(
    ctx: &PipelineContext,
    validators: &[CompiledValidator],
) -> anyhow::Result<AggregateReport> {
    let aggregator = Aggregator::new(
        ctx.config.codegen.duplicate_policy,
        ctx.config.codegen.id_strategy,
    );
    aggregator
        .write(validators, &ctx.layout)
        .context("failed to generate the aggregated validation module")
}

/// Every schema document currently in the schema directory.
#[must_use]
pub fn scan_schemas(ctx: &PipelineContext) -> Vec<PathBuf> {
    discover_schemas(&ctx.layout.schemas_dir())
}

/// Scanned schemas in manifest order, then leftovers from earlier runs in
/// file-name order. Batch order decides which module keeps a shared
/// definition name, so a rescan must not reorder this run's schemas.
fn order_by_plan(planned: Vec<PathBuf>, scanned: Vec<PathBuf>) -> Vec<PathBuf> {
    let on_disk: HashSet<&PathBuf> = scanned.iter().collect();
    let mut ordered: Vec<PathBuf> = planned
        .into_iter()
        .filter(|p| on_disk.contains(p))
        .collect();
    let leftovers: Vec<PathBuf> = scanned
        .iter()
        .filter(|p| !ordered.contains(p))
        .cloned()
        .collect();
    ordered.extend(leftovers);
    ordered
}

/// Full run. Only manifest and aggregation failures abort it.
pub fn run(ctx: &PipelineContext) -> anyhow::Result<RunReport> {
    let manifest = with_spinner(
        "Reading manifest",
        |m: &Manifest| format!("Manifest: {} module(s)", m.len()),
        || load_manifest(ctx),
    )?;

    let built = with_spinner(
        "Building schemas",
        |r: &BuildReport| format!("Schemas: {} written", r.built.len()),
        || build_schemas(ctx, &manifest),
    )?;

    let schema_paths = if ctx.config.pipeline.rescan_schema_dir {
        order_by_plan(built.schema_paths(), scan_schemas(ctx))
    } else {
        built.schema_paths()
    };

    let (runtime, compiled) = with_spinner(
        "Compiling validators",
        |(_, r): &(PathBuf, CompileReport)| format!("Validators: {} compiled", r.compiled.len()),
        || compile_validators(ctx, &schema_paths),
    )?;

    let aggregated = with_spinner(
        "Generating validation module",
        |r: &AggregateReport| format!("Validation module: {} function(s)", r.functions.len()),
        || aggregate(ctx, &compiled.compiled),
    )?;

    Ok(RunReport {
        manifest: manifest.path.clone(),
        modules: manifest.len(),
        schemas: schema_paths,
        validators: CompileSummary::new(runtime, &compiled),
        aggregated,
        failed_modules: built.failed_modules,
    })
}
