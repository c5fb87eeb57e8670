//! Rook daemon launcher
//!
//! Entry point of the `rook` binary. Parses the command line, sets up
//! logging and runs the selected command. Any error is fatal: it is logged
//! and the process exits with a non-zero status.

use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rook::cmd::{self, Cli};

// =============================================================================
// Main
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_json);

    if let Err(e) = cmd::run(cli).await {
        if e.is_configuration() {
            error!("invalid configuration: {}", e);
        } else {
            error!("{}", e);
        }
        std::process::exit(e.exit_code());
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(log_level: &str, json: bool) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "kube=info", "tower=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
