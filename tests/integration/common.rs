//! Shared helpers for the integration tests.

use anyhow::Result;
use assert_cmd::Command;
use depalign_cli::alignment::AlignmentAuthority;
use depalign_cli::coordinate::Coordinate;
use depalign_cli::core::AlignError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// An authority that counts its calls and answers from a fixed map.
pub struct CountingAuthority {
    calls: AtomicUsize,
    versions: HashMap<Coordinate, String>,
}

impl CountingAuthority {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            versions: entries
                .iter()
                .map(|(coordinate, version)| (coordinate.parse().unwrap(), (*version).to_string()))
                .collect(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AlignmentAuthority for CountingAuthority {
    fn translate(&self, coordinates: &[Coordinate]) -> Result<HashMap<Coordinate, String>, AlignError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(coordinates
            .iter()
            .filter_map(|c| self.versions.get(c).map(|v| (c.clone(), v.clone())))
            .collect())
    }
}

/// An authority that is never reachable.
pub struct UnreachableAuthority;

impl AlignmentAuthority for UnreachableAuthority {
    fn translate(&self, _: &[Coordinate]) -> Result<HashMap<Coordinate, String>, AlignError> {
        Err(AlignError::AlignmentUnavailable {
            reason: "connection refused".to_string(),
        })
    }
}

/// A scratch directory with the files one `depalign` run needs.
pub struct Workspace {
    temp: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.file(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// `depalign` with this workspace as working directory and no ambient configuration.
    pub fn depalign(&self) -> Command {
        let mut cmd = Command::cargo_bin("depalign").unwrap();
        cmd.current_dir(self.path()).env_remove("DEPALIGN_CONFIG").env_remove("RUST_LOG");
        cmd
    }
}

pub const SCENARIO_BUILD: &str = r#"
[root]
name = "root"
group = "org.acme"
version = "1.0"

[[modules]]
path = ":subA"
dependencies = ["g:a:1.0"]

[[modules]]
path = ":subB"
dependencies = ["g:a:1.0", "g:b:2.0"]
"#;

pub const SCENARIO_AUTHORITY: &str = r#"
[versions]
"g:a:1.0" = "1.0-redhat-1"
"#;

pub const SCENARIO_CONFIG: &str = r#"
authority = "authority.toml"

[dependency_override]
"g:b:*@*" = "2.0-redhat-9"
"#;
