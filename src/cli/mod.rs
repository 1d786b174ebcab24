//! CLI module for Ombud.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Ombud - LLM agents over sample databases
///
/// A CLI for running LLM tool-calling agents against two sample SQLite
/// databases (customer support and inventory). The name "Ombud" comes from
/// the Scandinavian word for "representative" - one who acts on your behalf.
#[derive(Parser, Debug)]
#[command(name = "ombud")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Ombud: seed the sample databases and create a config file
    Init,

    /// Check API configuration and database state
    Doctor,

    /// Run an agent on a one-shot task
    Run {
        /// The task for the agent (e.g., "Why hasn't order ORD12345 arrived?")
        task: String,

        /// Database domain to work against (support, inventory)
        #[arg(short, long, default_value = "support")]
        domain: String,

        /// Agent mode (direct, react, planning)
        #[arg(long)]
        mode: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive chat session with tool calling
    Chat {
        /// Database domain to work against (support, inventory)
        #[arg(short, long, default_value = "support")]
        domain: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage the sample databases
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum DbAction {
    /// Create and seed the sample databases (idempotent)
    Init {
        /// Limit to one domain (support, inventory); defaults to both
        #[arg(short, long)]
        domain: Option<String>,
    },

    /// Delete and re-seed the sample databases
    Reset {
        /// Limit to one domain (support, inventory); defaults to both
        #[arg(short, long)]
        domain: Option<String>,
    },

    /// Show tables, columns, and row counts
    Explore {
        /// Domain to explore (support, inventory)
        #[arg(short, long, default_value = "support")]
        domain: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "llm.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
