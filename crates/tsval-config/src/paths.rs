//! Input and output locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tsval_core::layout::MANIFEST_FILE_NAME;

use crate::error::ConfigError;
use crate::tsconfig::ProjectConfig;

/// Default tsconfig location.
fn default_tsconfig() -> PathBuf {
    PathBuf::from("tsconfig.json")
}

/// Default manifest file name.
fn default_manifest_name() -> String {
    String::from(MANIFEST_FILE_NAME)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Root searched for the manifest; validator code is written under it.
    /// Falls back to tsconfig `compilerOptions.rootDir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,

    /// Root for generated schema documents.
    /// Falls back to tsconfig `compilerOptions.outDir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_root: Option<PathBuf>,

    /// Project tsconfig handed to the introspector.
    #[serde(default = "default_tsconfig")]
    pub tsconfig: PathBuf,

    /// File name of the manifest.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_root: None,
            out_root: None,
            tsconfig: default_tsconfig(),
            manifest_name: default_manifest_name(),
        }
    }
}

/// Fully resolved, absolute-or-cwd-relative locations for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    pub source_root: PathBuf,
    pub out_root: PathBuf,
    pub tsconfig: PathBuf,
    pub manifest_name: String,
}

impl PathsConfig {
    /// Resolve roots, consulting the tsconfig only for missing ones.
    ///
    /// # Errors
    /// Returns a tsconfig read/parse error when the tsconfig is needed but
    /// unusable, or `MissingPath` when it lacks the needed option.
    pub fn resolve(&self) -> Result<ResolvedPaths, ConfigError> {
        let (source_root, out_root) = match (&self.source_root, &self.out_root) {
            (Some(src), Some(out)) => (src.clone(), out.clone()),
            (src, out) => {
                let project = ProjectConfig::read(&self.tsconfig)?;
                let source_root = src
                    .clone()
                    .or_else(|| project.root_dir())
                    .ok_or_else(|| missing("paths.source_root"))?;
                let out_root = out
                    .clone()
                    .or_else(|| project.out_dir())
                    .ok_or_else(|| missing("paths.out_root"))?;
                (source_root, out_root)
            }
        };

        if self.manifest_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "paths.manifest_name".into(),
                reason: "must not be empty".into(),
            });
        }

        Ok(ResolvedPaths {
            source_root,
            out_root,
            tsconfig: self.tsconfig.clone(),
            manifest_name: self.manifest_name.clone(),
        })
    }
}

fn missing(field: &str) -> ConfigError {
    ConfigError::MissingPath {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn explicit_roots_skip_tsconfig() {
        let config = PathsConfig {
            source_root: Some(PathBuf::from("src")),
            out_root: Some(PathBuf::from("out")),
            tsconfig: PathBuf::from("/does/not/exist/tsconfig.json"),
            ..PathsConfig::default()
        };
        let resolved = config.resolve().expect("explicit roots should resolve");
        assert_eq!(resolved.source_root, PathBuf::from("src"));
        assert_eq!(resolved.out_root, PathBuf::from("out"));
        assert_eq!(resolved.manifest_name, "toJSONSchema.ts");
    }

    #[test]
    fn missing_roots_come_from_tsconfig() {
        let temp = TempDir::new().expect("tempdir should create");
        let tsconfig = temp.path().join("tsconfig.json");
        std::fs::write(
            &tsconfig,
            r#"{ "compilerOptions": { "rootDir": "src", "outDir": "build" } }"#,
        )
        .expect("tsconfig should write");

        let config = PathsConfig {
            out_root: Some(PathBuf::from("custom-out")),
            tsconfig,
            ..PathsConfig::default()
        };
        let resolved = config.resolve().expect("roots should resolve");
        assert_eq!(resolved.source_root, temp.path().join("src"));
        assert_eq!(resolved.out_root, PathBuf::from("custom-out"));
    }

    #[test]
    fn tsconfig_without_out_dir_is_missing_path() {
        let temp = TempDir::new().expect("tempdir should create");
        let tsconfig = temp.path().join("tsconfig.json");
        std::fs::write(&tsconfig, r#"{ "compilerOptions": { "rootDir": "src" } }"#)
            .expect("tsconfig should write");

        let config = PathsConfig {
            tsconfig,
            ..PathsConfig::default()
        };
        let err = config.resolve().expect_err("outDir is required");
        assert!(matches!(err, ConfigError::MissingPath { field } if field == "paths.out_root"));
    }
}
