//! Entry point for the `chim` binary.

mod cli;
mod state;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::state::AppState;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let state = AppState::load(cli.data_dir.clone()).await?;

    match cli.command {
        Commands::Status => cli::status::handle_status(&state, cli.json).await,
        Commands::Part { command } => cli::builder::handle_part_command(command, &state).await,
        Commands::Animal { command } => cli::builder::handle_animal_command(command, &state).await,
        Commands::Credits { command } => {
            cli::credits::handle_credits_command(command, &state, cli.json).await
        }
        Commands::Generate { parts, json_card } => {
            cli::generate::handle_generate(&state, parts, json_card || cli.json).await
        }
        Commands::Reset => cli::builder::handle_reset(&state).await,
        Commands::Tutorial { ack } => cli::builder::handle_tutorial(&state, ack).await,
    }
}
