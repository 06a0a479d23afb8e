//! CLI definitions for the `parley` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Chat backend with Google sign-in and pluggable LLM providers.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file. Environment variables override its values.
    #[arg(long, short, global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Host to bind to. Overrides the configured host.
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on. Overrides the configured port.
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Create or upgrade the database schema, then exit.
    Migrate,
}

impl Cli {
    /// Default tracing filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "info,parley=debug,parley_core=debug,parley_infra=debug",
            _ => "trace",
        }
    }
}
