use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;

use cli::{Args, Mode};

/// Initialize console tracing. RUST_LOG overrides the default filter.
fn initialize_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,\
         bootgres_cli=debug,\
         bootgres_provisioner=debug"
            .into()
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    initialize_tracing();

    match args.mode {
        Mode::Run { output } => commands::bootstrap::run(output).await,
        Mode::Plan => commands::bootstrap::plan().await,
        Mode::Config => commands::bootstrap::show_config(),
    }
}
