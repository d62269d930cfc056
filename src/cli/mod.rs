//! Command-line interface for depalign.
//!
//! # Commands
//!
//! - `align` - Align a build's dependencies and write the alignment model
//! - `next-version` - Print the next suffixed version of a version string
//! - `show` - Print one module of a written alignment model
//!
//! # Global options
//!
//! - `--verbose` / `-v` - Debug logging
//! - `--quiet` / `-q` - Errors only
//! - `--config` / `-c` - Alignment configuration file (also `DEPALIGN_CONFIG`)
//!
//! # Examples
//!
//! ```bash
//! depalign align --build build.toml
//! depalign align --build build.toml -D versionIncrementalSuffix=temporary --report report.txt
//! depalign next-version 1.0-redhat-00004
//! depalign show manipulation.json --module subA
//! ```

mod align;
mod next_version;
mod show;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{AlignmentConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME};

pub use align::AlignCommand;
pub use next_version::NextVersionCommand;
pub use show::ShowCommand;

/// Where the alignment configuration comes from.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit configuration path; must exist when set
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, `depalign.toml` in the current directory
    /// is used when present, and the defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration cannot be read or parsed.
    pub fn load(&self) -> Result<AlignmentConfig> {
        match &self.config_path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                crate::config::parse_config(path)
            }
            None => AlignmentConfig::load_or_default(Path::new(CONFIG_FILE_NAME)),
        }
    }

    /// Directory that relative locations in the configuration are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

#[derive(Parser)]
#[command(
    name = "depalign",
    about = "Align dependency versions across the modules of a build",
    version,
    long_about = "depalign collects the dependencies of every module in a build, asks one \
                  alignment authority for replacement versions, applies exclusion and override \
                  rules, and writes the aligned versions and the new project version into an \
                  alignment model."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Alignment configuration file
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Align a build and write the alignment model
    Align(AlignCommand),

    /// Print the next suffixed version
    NextVersion(NextVersionCommand),

    /// Print a module of an alignment model
    Show(ShowCommand),
}

impl Cli {
    /// Log level the binary should install, `None` to defer to `RUST_LOG`.
    #[must_use]
    pub fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        CliConfig {
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Run the selected command with an explicit configuration source.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Align(cmd) => cmd.execute(&config).await,
            Commands::NextVersion(cmd) => cmd.execute(),
            Commands::Show(cmd) => cmd.execute(),
        }
    }
}
