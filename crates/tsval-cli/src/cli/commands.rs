use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the whole pipeline: manifest, schemas, validators, aggregated module.
    Generate(GenerateArgs),
    /// Print the manifest the pipeline would use.
    Manifest(PathArgs),
    /// Build and write schema documents only.
    Schemas(PathArgs),
    /// Compile every schema document in the schema directory.
    Compile(PathArgs),
    /// Validate a JSON file with the validator that owns a definition.
    Check(CheckArgs),
}

/// Location overrides; unset values come from configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct PathArgs {
    /// Source root searched for the manifest
    #[arg(long = "src", value_name = "DIR")]
    pub source_root: Option<PathBuf>,

    /// Output root for schema documents
    #[arg(long = "out", value_name = "DIR")]
    pub out_root: Option<PathBuf>,

    /// Project tsconfig.json
    #[arg(long, value_name = "FILE")]
    pub tsconfig: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Hand schemas to the compiler by scanning the schema directory
    #[arg(long)]
    pub rescan: bool,

    /// Process modules and schemas one at a time
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Definition name, as in `validate<Name>`
    #[arg(long, short = 't', value_name = "NAME")]
    pub definition: String,

    /// JSON file holding the value to validate
    #[arg(value_name = "FILE")]
    pub data: PathBuf,
}
