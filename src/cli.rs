//! CLI definitions for LobbyHands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// LobbyHands CLI.
#[derive(Parser)]
#[command(name = "lobbyhands")]
#[command(about = "Unattended lobby keeper with infinite-mode cycling")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults to the user config directory)
    #[arg(short, long, env = "LOBBYHANDS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Keep the lobby alive (default)
    Run {
        /// Do not read operator commands from stdin
        #[arg(long)]
        no_console: bool,
    },

    /// Print cycle counters and statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Zero the durable cycle counters and statistics
    ClearStats,

    /// Trigger management commands
    Triggers {
        #[command(subcommand)]
        action: TriggerAction,
    },

    /// Entity management commands
    Entities {
        #[command(subcommand)]
        action: EntityAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum TriggerAction {
    /// List all triggers
    List,

    /// Add a trigger firing at a cycle count
    Add { entity: String, threshold: u64 },

    /// Remove a trigger
    Remove { entity: String, threshold: u64 },

    /// Re-arm a trigger
    Enable { entity: String, threshold: u64 },

    /// Disarm a trigger
    Disable { entity: String, threshold: u64 },
}

#[derive(Subcommand)]
pub(crate) enum EntityAction {
    /// Add an entity
    Add {
        id: String,

        /// Display name (defaults to the id)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Remove an entity and its triggers
    Remove { id: String },

    /// Set the delay between an entity's clicks (0.1 to 10 seconds)
    Delay { id: String, secs: f64 },

    /// Replace an entity's click sequence, each step as `x,y[:description]`
    Clicks {
        id: String,
        #[arg(required = true)]
        steps: Vec<String>,
    },
}
