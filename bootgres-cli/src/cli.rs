use clap::{Parser, Subcommand};

/// Bootgres - one-shot PostgreSQL database bootstrap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Provision the database, schema, roles, and optional CDC publication
    Run {
        /// Output format
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Print the derived target and statement plan without connecting
    Plan,

    /// Show the resolved configuration (secret ids only, never payloads)
    Config,
}
