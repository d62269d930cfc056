use anyhow::Result;
use clap::Args;

use crate::core::AlignError;
use crate::version::{DEFAULT_PADDING, DEFAULT_SUFFIX, MAX_PADDING, next_version};

/// Print the version the next alignment would assign.
#[derive(Args, Debug)]
pub struct NextVersionCommand {
    /// Current version, suffixed or not
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Suffix token
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Minimum width of the counter
    #[arg(long, default_value_t = DEFAULT_PADDING)]
    pub padding: usize,
}

impl NextVersionCommand {
    /// Compute the next version.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::ConfigError`] for an empty suffix or a padding outside
    /// `1..=MAX_PADDING`.
    pub fn compute(&self) -> Result<String, AlignError> {
        if self.suffix.trim().is_empty() {
            return Err(AlignError::ConfigError {
                message: "Suffix must not be empty".to_string(),
            });
        }
        if self.padding == 0 || self.padding > MAX_PADDING {
            return Err(AlignError::ConfigError {
                message: format!("Padding must be between 1 and {MAX_PADDING}"),
            });
        }
        Ok(next_version(&self.version, &self.suffix, self.padding))
    }

    /// # Errors
    ///
    /// See [`NextVersionCommand::compute`].
    pub fn execute(self) -> Result<()> {
        println!("{}", self.compute()?);
        Ok(())
    }
}
