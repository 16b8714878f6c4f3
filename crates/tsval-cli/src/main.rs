use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;
mod pipeline;
mod progress;
mod ui;

fn main() {
    if let Err(error) = run() {
        eprintln!("tsval error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    commands::dispatch(cli.command, &flags)
}

/// Default filter when `TSVAL_LOG` is unset; `--quiet` wins over `--verbose`.
const fn log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TSVAL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level(quiet, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::{cli::Cli, log_level};

    #[test]
    fn verbose_flag_selects_debug_logging() {
        let cli = Cli::try_parse_from(["tsval", "generate", "-v"]).expect("cli should parse");
        assert_eq!(log_level(cli.quiet, cli.verbose), "debug");
        assert_eq!(log_level(true, true), "error");
        assert_eq!(log_level(false, false), "warn");
    }
}
