//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the surge staffing simulator.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Surge Sim - Surge-staffing stakeholder interview simulator
///
/// Interview a CFO, a physician and a nurse manager about an ICU staffing
/// surge, then pin their answers into model-building buckets.
#[derive(Parser, Debug)]
#[command(name = "surge-sim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(short, long, env = "SURGE_CONFIG")]
        config: Option<String>,

        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Interview the personas in this terminal
    Play {
        /// Path to configuration file
        #[arg(short, long, env = "SURGE_CONFIG")]
        config: Option<String>,

        /// Session seed (defaults to session.default_seed)
        #[arg(short, long, allow_negative_numbers = true)]
        seed: Option<i64>,

        /// Persona to address first: finance, clinical, operations or auto
        #[arg(long, default_value = "auto")]
        persona: String,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Inspect and export persona definitions
    Persona {
        /// Path to configuration file
        #[arg(short, long, env = "SURGE_CONFIG", global = true)]
        config: Option<String>,

        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonaSubcommand {
    /// List the three personas
    List,

    /// Print one persona's full card
    Show {
        /// Persona: finance, clinical, operations (or cfo, physician, manager)
        persona: String,
    },

    /// Write the bundled definitions to a directory for editing
    Export {
        /// Target directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Overwrite files that already exist
        #[arg(short, long)]
        force: bool,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
