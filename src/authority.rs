//! Alignment authorities backed by translation tables.
//!
//! A translation table maps requested coordinates to aligned versions. On disk it is a TOML
//! file with a single `[versions]` table:
//!
//! ```toml
//! [versions]
//! "org.hibernate:hibernate-core:5.3.7.Final" = "5.3.7.Final-redhat-00001"
//! "org.acme:root:1.0" = "1.0-redhat-00002"
//! ```
//!
//! Keys are full `group:artifact:version` coordinates, so quoting is required.
//!
//! Two authorities are provided:
//! - [`TranslationTable`] answers from memory
//! - [`FileAuthority`] reads a table file at call time, so an unreadable or broken table
//!   surfaces as [`AlignError::AlignmentUnavailable`] from the alignment itself

use crate::alignment::AlignmentAuthority;
use crate::config::parse_config;
use crate::coordinate::Coordinate;
use crate::core::AlignError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TranslationFile {
    #[serde(default)]
    versions: BTreeMap<String, String>,
}

/// An in-memory translation map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    versions: HashMap<Coordinate, String>,
}

impl TranslationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the aligned version of one coordinate.
    pub fn insert(&mut self, coordinate: Coordinate, version: impl Into<String>) {
        self.versions.insert(coordinate, version.into());
    }

    /// Builder form of [`TranslationTable::insert`].
    #[must_use]
    pub fn with(mut self, coordinate: Coordinate, version: impl Into<String>) -> Self {
        self.insert(coordinate, version);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Load a table file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, or a key is not a
    /// coordinate.
    pub fn load(path: &Path) -> Result<Self> {
        let file: TranslationFile = parse_config(path)?;
        Self::from_entries(file.versions)
            .with_context(|| format!("Invalid translation table: {}", path.display()))
    }

    fn from_entries(entries: BTreeMap<String, String>) -> Result<Self> {
        let mut table = Self::new();
        for (key, version) in entries {
            let coordinate: Coordinate = key.parse()?;
            if coordinate.version.is_empty() {
                return Err(AlignError::ConfigError {
                    message: format!("Translation key '{key}' has no version"),
                }
                .into());
            }
            table.insert(coordinate, version);
        }
        Ok(table)
    }
}

impl AlignmentAuthority for TranslationTable {
    fn translate(&self, coordinates: &[Coordinate]) -> Result<HashMap<Coordinate, String>, AlignError> {
        let translated: HashMap<Coordinate, String> = coordinates
            .iter()
            .filter_map(|c| self.versions.get(c).map(|v| (c.clone(), v.clone())))
            .collect();
        debug!(
            "Translation table answered {} of {} coordinates",
            translated.len(),
            coordinates.len()
        );
        Ok(translated)
    }
}

/// A translation table read from disk on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAuthority {
    path: PathBuf,
}

impl FileAuthority {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlignmentAuthority for FileAuthority {
    fn translate(&self, coordinates: &[Coordinate]) -> Result<HashMap<Coordinate, String>, AlignError> {
        let table = TranslationTable::load(&self.path).map_err(|e| AlignError::AlignmentUnavailable {
            reason: format!("{e:#}"),
        })?;
        table.translate(coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_translate_returns_only_known_coordinates() {
        let table = TranslationTable::new().with(Coordinate::new("g", "a", "1.0"), "1.0-redhat-1");
        let result = table
            .translate(&[Coordinate::new("g", "a", "1.0"), Coordinate::new("g", "b", "2.0")])
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[&Coordinate::new("g", "a", "1.0")], "1.0-redhat-1");
    }

    #[test]
    fn test_load_table_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("authority.toml");
        fs::write(
            &path,
            r#"
[versions]
"g:a:1.0" = "1.0-redhat-1"
"org.acme:root:1.0" = "1.0-redhat-00002"
"#,
        )
        .unwrap();

        let table = TranslationTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_key_without_version_is_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("authority.toml");
        fs::write(&path, "[versions]\n\"g:a\" = \"1\"\n").unwrap();

        assert!(TranslationTable::load(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_alignment_unavailable() {
        let temp = tempdir().unwrap();
        let authority = FileAuthority::new(temp.path().join("missing.toml"));
        let err = authority.translate(&[Coordinate::new("g", "a", "1.0")]).unwrap_err();
        assert!(matches!(err, AlignError::AlignmentUnavailable { .. }));
    }
}
