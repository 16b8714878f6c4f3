use crate::cli::{Commands, GlobalFlags};

pub mod check;
pub mod compile;
pub mod generate;
pub mod manifest;
pub mod schemas;

/// Route a parsed subcommand to its handler.
pub fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Generate(args) => generate::handle(&args, flags),
        Commands::Manifest(args) => manifest::handle(&args, flags),
        Commands::Schemas(args) => schemas::handle(&args, flags),
        Commands::Compile(args) => compile::handle(&args, flags),
        Commands::Check(args) => check::handle(&args, flags),
    }
}
