//! TOML parsing for depalign's input files.
//!
//! The configuration file, the build description and translation tables are all TOML
//! documents read through [`parse_config`], so every one of them reports read and syntax
//! errors the same way.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize a TOML file.
///
/// # Errors
///
/// Returns an error naming the file when it cannot be read or does not deserialize into `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content, &path.display().to_string())
}

/// Deserialize TOML text; `origin` names the source in error messages.
///
/// # Errors
///
/// Returns an error when `content` does not deserialize into `T`.
pub fn parse_config_str<T>(content: &str, origin: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let value: T =
        toml::from_str(content).with_context(|| format!("Failed to parse config file: {origin}"))?;
    Ok(value)
}
