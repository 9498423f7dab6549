use clap::Parser;
use eyre::Result;

use repgen_cli::cli::Cli;
use repgen_cli::{commands, config};

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;
    tracing::debug!(database = %config.database.display(), "config loaded");

    commands::run(cli.command, &config, cli.config.as_deref())
}
