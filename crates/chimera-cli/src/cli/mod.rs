//! CLI command definitions and dispatch for the `chim` binary.
//!
//! Uses clap derive macros with a verb-noun layout (`chim part next`,
//! `chim credits add 10`). Subcommand handlers live in sibling modules.

pub mod builder;
pub mod credits;
pub mod generate;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use chimera_types::part::PartKey;

/// Assemble composite creatures from the command line.
#[derive(Parser)]
#[command(name = "chim", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed output (-v for info, -vv for debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the data directory.
    #[arg(long, global = true, env = "CHIMERA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current session, locks, and balance.
    Status,

    /// Navigate or set the active body-part slot.
    Part {
        #[command(subcommand)]
        command: PartCommand,
    },

    /// Navigate or set the animal for the active slot.
    Animal {
        #[command(subcommand)]
        command: AnimalCommand,
    },

    /// Inspect or change the credits balance.
    Credits {
        #[command(subcommand)]
        command: CreditsCommand,
    },

    /// Spend credits to run a simulated generation.
    Generate {
        /// Restrict the request to these slots (comma-separated names).
        #[arg(long, value_delimiter = ',')]
        parts: Option<Vec<PartKey>>,

        /// Print the result card as JSON.
        #[arg(long)]
        json_card: bool,
    },

    /// Clear persisted state and re-randomize the session.
    Reset,

    /// Show or acknowledge the first-run tutorial flag.
    Tutorial {
        /// Mark the tutorial as seen.
        #[arg(long)]
        ack: bool,
    },
}

#[derive(Subcommand)]
pub enum PartCommand {
    /// Cycle forward through the slots.
    Next,
    /// Cycle backward through the slots.
    Prev,
    /// Jump to a slot by name.
    Set { part: PartKey },
}

#[derive(Subcommand)]
pub enum AnimalCommand {
    /// Cycle forward within the animals supporting the active slot.
    Next,
    /// Cycle backward within the animals supporting the active slot.
    Prev,
    /// Assign an animal by raw catalog index (wraps out-of-range input).
    Set { index: i64 },
}

#[derive(Subcommand)]
pub enum CreditsCommand {
    /// Show the balance and the ever-topped-up flag.
    Show,
    /// Add credits (simulated top-up; unlocks premium content).
    Add { amount: i64 },
    /// Spend credits directly (demo of the spend path).
    Spend { amount: i64 },
}
