//! Command line interface
//!
//! ```text
//! rook [--log-level <level>] [--log-json] <command>
//!
//!   osd       generates osd config and runs the osd daemon (hidden)
//!   version   print the version
//! ```
//!
//! Every flag can also be set through an environment variable named
//! `ROOK_<FLAG>`, e.g. `ROOK_DATA_DEVICES` for `--data-devices`.

pub mod cluster;
pub mod osd;

pub use cluster::*;
pub use osd::*;

use crate::error::Result;
use clap::{Parser, Subcommand};

/// Rook, storage orchestration for Kubernetes
#[derive(Parser, Debug)]
#[command(name = "rook", author, version, about, long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ROOK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true, env = "ROOK_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates osd config and runs the osd daemon
    #[command(hide = true)]
    Osd(OsdArgs),

    /// Print the version
    Version,
}

/// Dispatch the parsed command
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Osd(args) => start_osd(args, &cli.log_level).await,
        Commands::Version => {
            println!("rook: {}", crate::VERSION);
            Ok(())
        }
    }
}
