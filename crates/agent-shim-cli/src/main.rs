//! CLI entry point - the composition root.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use agent_shim_cli::{Cli, Commands, error::exit_code_for, handlers};

#[tokio::main]
async fn main() {
    // Load .env before clap reads environment-backed flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings.to_settings();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => handlers::serve::execute(&settings).await?,
        Commands::Exec { prompt, system } => {
            handlers::exec::execute(&settings, &prompt, system.as_deref()).await?;
        }
        Commands::Check => handlers::check::execute(&settings)?,
    }
    Ok(())
}
