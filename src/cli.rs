//! Command-line interface definition for Routine Builder
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the relay server, catalog browsing, selection
//! management, and the routine chat assistant.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Routine Builder - product picker and routine chat assistant
///
/// Browse the product catalog, build a selection, and ask the assistant for
/// a routine through a relay that holds the upstream credential.
#[derive(Parser, Debug, Clone)]
#[command(name = "routine-builder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "ROUTINE_BUILDER_JSON_LOGS")]
    pub json_logs: bool,

    /// Override the catalog file path
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Override the selection database path
    #[arg(long)]
    pub storage_path: Option<PathBuf>,

    /// Override the relay URL used by the chat client
    #[arg(long)]
    pub relay_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Routine Builder
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the chat relay server
    Serve {
        /// Socket address to bind (overrides relay.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Browse the product catalog
    Products {
        /// Catalog subcommand
        #[command(subcommand)]
        command: ProductCommand,
    },

    /// Manage the selected products
    Select {
        /// Selection subcommand
        #[command(subcommand)]
        command: SelectCommand,
    },

    /// Start an interactive chat with the routine assistant
    Chat,

    /// Generate a routine for the current selection and print it
    Routine,
}

/// Catalog subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProductCommand {
    /// List products, optionally filtered by category
    List {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Output as pretty-printed JSON
        #[arg(long)]
        json: bool,
    },

    /// List the categories present in the catalog
    Categories,
}

/// Selection subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SelectCommand {
    /// Add the product if unselected, remove it if selected
    Toggle {
        /// Product id
        id: u64,
    },

    /// Remove a product from the selection
    Remove {
        /// Product id
        id: u64,
    },

    /// Remove every product from the selection
    Clear,

    /// Show the current selection
    List {
        /// Output as pretty-printed JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            catalog: None,
            storage_path: None,
            relay_url: None,
            command: Commands::Select {
                command: SelectCommand::List { json: false },
            },
        }
    }
}
