//! Shared result types and the CLI command set.
use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use crate::IslandError;

/// A specialized Result type for idea-islands operations.
pub type Result<T> = std::result::Result<T, IslandError>;

/// Ideas taken from one island
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaList {
    pub island_name: String,
    pub ideas: Vec<String>,
}

/// An island's text exactly as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawContent {
    pub island_name: String,
    pub content: String,
}

/// Id and name of an island, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IslandSummary {
    pub id: String,
    pub name: String,
}

/// Available subcommands for the islands application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new island
    Create {
        /// Name of the island
        name: String,
    },

    /// Change an island's name or content
    Update {
        /// ID of the island to update
        id: String,

        /// New name for the island
        #[clap(short = 'N', long)]
        name: Option<String>,

        /// New content, one idea per line
        #[clap(short, long, conflicts_with_all = ["file", "edit"])]
        content: Option<String>,

        /// Path to a file holding the new content
        #[clap(short, long, conflicts_with = "edit")]
        file: Option<PathBuf>,

        /// Open the current content in an editor
        #[clap(short, long)]
        edit: bool,
    },

    /// Delete an island
    Delete {
        /// ID of the island to delete
        id: String,

        /// Delete locally even if the peer cannot be reached, without asking
        #[clap(long)]
        force_local: bool,
    },

    /// List all islands
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show random ideas from an island
    Ideas {
        /// ID of the island
        id: String,

        /// Number of ideas to pick
        #[clap(short = 'n', long)]
        count: Option<usize>,

        /// Show every idea in order instead of a random pick
        #[clap(short, long)]
        all: bool,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Print an island's raw content
    Raw {
        /// ID of the island
        id: String,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Overwrite the peer's islands with the local ones
    Sync {
        /// Skip confirmation prompt
        #[clap(short, long)]
        yes: bool,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Write the current configuration to the config file
        #[clap(short, long)]
        write: bool,
    },
}
