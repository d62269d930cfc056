//! File system helpers.
//!
//! Every file depalign produces (the alignment model and the reports) is written through
//! [`atomic_write`], so a crash mid-write never leaves a truncated file behind for the rest
//! of the build to read.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Create a directory and its parents if they do not exist.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or the path exists and is not a
/// directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_context(|| {
            format!(
                "Failed to create directory: {}\n\nCheck directory permissions and path validity",
                path.display()
            )
        })?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Write `content` to `path` through a temporary file and a rename.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error when the temporary file cannot be written, synced or renamed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path).with_context(|| {
            format!(
                "Failed to create temp file: {}\n\nCheck file permissions and that directory exists",
                temp_path.display()
            )
        })?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Read a file to a string with the path in the error message.
///
/// # Errors
///
/// Returns an error when the file cannot be read.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}
