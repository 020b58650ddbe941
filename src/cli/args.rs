use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    name = "islands",
    version,
    about = "Idea Islands: named lists of ideas, one per line, replicated to a peer"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Path to the islands data file
    #[clap(long, value_parser)]
    pub data_file: Option<PathBuf>,

    /// Base URL of the peer service to replicate to
    #[clap(long)]
    pub peer: Option<String>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the islands application
    #[clap(subcommand)]
    pub command: Commands,
}
