//! Minimal `tsconfig.json` reader.
//!
//! Only `compilerOptions.rootDir` and `compilerOptions.outDir` are consumed.
//! Both resolve against the directory holding the tsconfig file. Comments
//! and trailing commas are accepted, as `tsc` accepts them.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default)]
    pub root_dir: Option<String>,
    #[serde(default)]
    pub out_dir: Option<String>,
}

/// A parsed tsconfig together with its location.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub path: PathBuf,
    pub config: TsConfig,
}

impl ProjectConfig {
    /// Read and parse `path`.
    ///
    /// # Errors
    /// `TsConfigRead` when the file cannot be read, `TsConfigParse` when it is
    /// not JSON.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::TsConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&text).map_err(|source| ConfigError::TsConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// Directory the compiler options are relative to.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// `rootDir` resolved against the tsconfig directory.
    #[must_use]
    pub fn root_dir(&self) -> Option<PathBuf> {
        self.config
            .compiler_options
            .root_dir
            .as_ref()
            .map(|dir| self.base_dir().join(dir))
    }

    /// `outDir` resolved against the tsconfig directory.
    #[must_use]
    pub fn out_dir(&self) -> Option<PathBuf> {
        self.config
            .compiler_options
            .out_dir
            .as_ref()
            .map(|dir| self.base_dir().join(dir))
    }
}

/// Parse tsconfig text.
///
/// # Errors
/// Returns the `serde_json` error for malformed input.
pub fn parse(text: &str) -> Result<TsConfig, serde_json::Error> {
    serde_json::from_str(&strip_jsonc(text))
}

/// Remove `//` and `/* */` comments and trailing commas outside strings.
fn strip_jsonc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
            }
            ',' => {
                let rest = chars.clone().find(|next| !next.is_whitespace());
                if !matches!(rest, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn reads_root_and_out_dir_relative_to_file() {
        let temp = TempDir::new().expect("tempdir should create");
        let path = temp.path().join("tsconfig.json");
        std::fs::write(
            &path,
            r#"{ "compilerOptions": { "rootDir": "src", "outDir": "dist" } }"#,
        )
        .expect("tsconfig should write");

        let project = ProjectConfig::read(&path).expect("tsconfig should parse");
        assert_eq!(project.root_dir(), Some(temp.path().join("src")));
        assert_eq!(project.out_dir(), Some(temp.path().join("dist")));
    }

    #[test]
    fn accepts_comments_and_trailing_commas() {
        let config = parse(
            r#"{
                // line comment
                "compilerOptions": {
                    /* block */ "rootDir": "./src",
                    "outDir": "http://not-a-comment",
                },
            }"#,
        )
        .expect("jsonc should parse");

        assert_eq!(config.compiler_options.root_dir.as_deref(), Some("./src"));
        assert_eq!(
            config.compiler_options.out_dir.as_deref(),
            Some("http://not-a-comment")
        );
    }

    #[test]
    fn missing_compiler_options_is_empty() {
        let config = parse("{}").expect("empty object should parse");
        assert!(config.compiler_options.root_dir.is_none());
        assert!(config.compiler_options.out_dir.is_none());
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().expect("tempdir should create");
        let err = ProjectConfig::read(&temp.path().join("tsconfig.json"))
            .expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::TsConfigRead { .. }));
    }
}
