//! Command-line interface for jobhub.

mod commands;

use clap::{Parser, Subcommand};

/// jobhub - search job boards from one place
#[derive(Parser)]
#[command(name = "jobhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Search every enabled job board and print the results
    #[command(alias = "s")]
    Search {
        /// Job title to search for
        #[arg(required = true)]
        title: Vec<String>,

        /// Location filter, e.g. "Bangalore" or "Remote"
        #[arg(long, short)]
        location: Option<String>,

        /// Restrict the search to one platform
        #[arg(long, short, default_value = "all")]
        platform: String,
    },

    /// Show recent searches
    #[command(alias = "h")]
    History {
        /// Number of entries to show
        #[arg(default_value = "10")]
        limit: u64,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
