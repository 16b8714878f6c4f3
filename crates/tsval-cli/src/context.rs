//! Per-run state shared by every stage.

use anyhow::Context;
use tsval_config::{ResolvedPaths, TsvalConfig};
use tsval_core::OutputLayout;

use crate::cli::{GlobalFlags, PathArgs};

/// Configuration, resolved locations and output layout for one run.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub config: TsvalConfig,
    pub paths: ResolvedPaths,
    pub layout: OutputLayout,
}

impl PipelineContext {
    /// Load layered configuration and apply command-line overrides.
    pub fn load(flags: &GlobalFlags, overrides: &PathArgs) -> anyhow::Result<Self> {
        let config = TsvalConfig::load_with_dotenv(flags.config.as_deref())
            .context("failed to load tsval configuration")?;
        Self::from_config(config, overrides)
    }

    pub fn from_config(mut config: TsvalConfig, overrides: &PathArgs) -> anyhow::Result<Self> {
        if let Some(src) = &overrides.source_root {
            config.paths.source_root = Some(src.clone());
        }
        if let Some(out) = &overrides.out_root {
            config.paths.out_root = Some(out.clone());
        }
        if let Some(tsconfig) = &overrides.tsconfig {
            config.paths.tsconfig = tsconfig.clone();
        }

        let paths = config
            .paths
            .resolve()
            .context("failed to resolve source and output roots")?;
        let layout = OutputLayout::new(&paths.source_root, &paths.out_root)
            .with_aggregated_file_name(config.codegen.output_file_name.clone());

        tracing::debug!(
            source_root = %paths.source_root.display(),
            out_root = %paths.out_root.display(),
            "pipeline context ready"
        );
        Ok(Self {
            config,
            paths,
            layout,
        })
    }
}
