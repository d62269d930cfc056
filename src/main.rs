//! depalign CLI entry point
//!
//! Parses arguments, installs logging, runs the command and renders errors:
//! - `align` - Align a build and write the alignment model
//! - `next-version` - Print the next suffixed version
//! - `show` - Print a module of an alignment model

use anyhow::Result;
use clap::Parser;
use depalign_cli::cli;
use depalign_cli::core::user_friendly_error;
use tracing_subscriber::EnvFilter;

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.log_level());

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
