//! Alignment reports.
//!
//! After a successful alignment the CLI can summarize what changed, either as text:
//!
//! ```text
//! ------------------- project org.acme:root
//! 	Project version : 1.0 --> 1.0-redhat-00001
//! 	Dependencies : org.hibernate:hibernate-core:5.3.7.Final --> org.hibernate:hibernate-core:5.3.7.Final-redhat-00001
//! ```
//!
//! or as JSON, with one entry per module:
//!
//! ```json
//! {
//!   "gav": { "originalGAV": "org.acme:root:1.0", "gav": "org.acme:root:1.0-redhat-00001" },
//!   "modules": [
//!     { "gav": { ... }, "dependencies": { "g:a:1.0": "g:a:1.0-redhat-1" } }
//!   ]
//! }
//! ```

use crate::barrier::AlignmentHandle;
use crate::model::{AlignmentModel, Module};
use crate::utils::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

const PROJECT_SEPARATOR: &str = "-------------------";

/// A module's coordinate before and after alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GavChange {
    #[serde(rename = "originalGAV")]
    pub original_gav: String,
    pub gav: String,
}

impl GavChange {
    fn of(module: &Module) -> Self {
        let coordinate = |version: Option<&str>| match version {
            Some(version) if !version.is_empty() => {
                format!("{}:{}:{}", module.group, module.name, version)
            }
            _ => format!("{}:{}", module.group, module.name),
        };
        Self {
            original_gav: coordinate(module.original_version.as_deref()),
            gav: coordinate(module.version()),
        }
    }

    fn changed(&self) -> bool {
        self.original_gav != self.gav
    }
}

/// What changed in one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReport {
    #[serde(skip)]
    pub path: String,
    #[serde(skip)]
    pub project: String,
    #[serde(skip)]
    pub original_version: Option<String>,
    #[serde(skip)]
    pub version: Option<String>,
    pub gav: GavChange,
    /// Original coordinate → replacement coordinate
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_aligned: Vec<String>,
}

/// The report over a whole model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub gav: GavChange,
    pub modules: Vec<ModuleReport>,
}

impl AlignmentReport {
    /// Summarize a finished model. Non-aligned dependencies are listed only when
    /// `report_non_aligned` is set.
    #[must_use]
    pub fn from_model(
        model: &AlignmentModel,
        handle: &AlignmentHandle,
        report_non_aligned: bool,
    ) -> Self {
        let modules = model
            .paths()
            .into_iter()
            .filter_map(|path| {
                let module = model.find(&path).ok()?;
                let non_aligned = if report_non_aligned {
                    handle
                        .non_aligned
                        .get(&path)
                        .map(|deps| deps.iter().map(ToString::to_string).collect())
                        .unwrap_or_default()
                } else {
                    Vec::new()
                };
                Some(ModuleReport {
                    project: format!("{}:{}", module.group, module.name),
                    original_version: module.original_version.clone(),
                    version: module.version().map(str::to_string),
                    gav: GavChange::of(module),
                    dependencies: module
                        .aligned_dependencies()
                        .iter()
                        .map(|(original, replacement)| (original.clone(), replacement.to_string()))
                        .collect(),
                    non_aligned,
                    path,
                })
            })
            .collect();

        Self {
            gav: GavChange::of(model.root()),
            modules,
        }
    }

    /// Number of dependency replacements over all modules.
    #[must_use]
    pub fn replacement_count(&self) -> usize {
        self.modules.iter().map(|m| m.dependencies.len()).sum()
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for module in &self.modules {
            let _ = writeln!(out, "{PROJECT_SEPARATOR} project {}", module.project);
            if module.gav.changed() {
                let _ = writeln!(
                    out,
                    "\tProject version : {} --> {}",
                    module.original_version.as_deref().unwrap_or_default(),
                    module.version.as_deref().unwrap_or_default()
                );
            }
            for (original, replacement) in &module.dependencies {
                let _ = writeln!(out, "\tDependencies : {original} --> {replacement}");
            }
            for coordinate in &module.non_aligned {
                let _ = writeln!(out, "\tNon-Aligned Dependencies : {coordinate}");
            }
        }
        out
    }

    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(self).context("Failed to serialize alignment report")?;
        json.push('\n');
        Ok(json)
    }

    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write_text(&self, path: &Path) -> Result<()> {
        atomic_write(path, self.render_text().as_bytes())
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        atomic_write(path, self.to_json()?.as_bytes())
            .with_context(|| format!("Failed to write JSON report: {}", path.display()))
    }
}
