//! # tsval-config
//!
//! Layered configuration loading for tsval using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TSVAL_*` prefix, `__` as separator)
//! 2. Project-level `tsval.toml` (or the file given with `--config`)
//! 3. User-level `~/.config/tsval/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `TSVAL_PATHS__SOURCE_ROOT` -> `paths.source_root`,
//! `TSVAL_CODEGEN__DUPLICATE_POLICY` -> `codegen.duplicate_policy`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use tsval_config::TsvalConfig;
//!
//! let config = TsvalConfig::load_with_dotenv(None).expect("config");
//! let paths = config.paths.resolve().expect("paths");
//! println!("schemas go to {}", paths.out_root.display());
//! ```

mod codegen;
mod error;
mod paths;
mod pipeline;
mod schema;
pub mod tsconfig;

pub use codegen::CodegenConfig;
pub use error::ConfigError;
pub use paths::{PathsConfig, ResolvedPaths};
pub use pipeline::PipelineConfig;
pub use schema::SchemaConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "tsval.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TSVAL_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TsvalConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl TsvalConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// `config_file` replaces the project-local `tsval.toml` when given.
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    /// Returns `ConfigError::Figment` when a source is malformed or a value
    /// has the wrong type.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(config_file).extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    /// Same as [`Self::load`].
    pub fn load_with_dotenv(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(config_file)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config, or the explicit file
        let local_path =
            config_file.map_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE), Path::to_path_buf);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tsval").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsval_core::{DuplicatePolicy, IdStrategy};

    #[test]
    fn default_config_loads() {
        let config = TsvalConfig::default();
        assert!(config.paths.source_root.is_none());
        assert!(config.schema.additional_properties);
        assert!(config.schema.encode_refs);
        assert!(!config.schema.restrict_to_requested);
        assert!(!config.pipeline.rescan_schema_dir);
        assert!(config.pipeline.parallel);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: TsvalConfig = TsvalConfig::figment(None).extract()?;
            assert_eq!(config.paths.manifest_name, "toJSONSchema.ts");
            assert_eq!(config.codegen.duplicate_policy, DuplicatePolicy::KeepFirst);
            assert_eq!(config.codegen.id_strategy, IdStrategy::Random);
            Ok(())
        });
    }
}
