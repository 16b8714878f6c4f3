use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod global;

pub use commands::{CheckArgs, Commands, GenerateArgs, PathArgs};
pub use global::{GlobalFlags, OutputFormat};

/// Top-level CLI parser for the `tsval` binary.
#[derive(Debug, Parser)]
#[command(
    name = "tsval",
    version,
    about = "Generate JSON Schemas and standalone validators from TypeScript types"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file used instead of ./tsval.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            config: self.config.clone(),
        }
    }
}
