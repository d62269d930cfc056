//! The alignment model: the per-module result of one alignment.
//!
//! The model is a tree of [`Module`] nodes rooted at the build's root project. Its shape
//! (names and parent/child links) is fixed when the build is described, before alignment
//! starts. Alignment only fills in value fields:
//!
//! - `version` is assigned exactly once, see [`Module::assign_version`]
//! - `aligned_dependencies` maps each dependency exactly as a module declared it
//!   (`g:a:1.+`) to its replacement coordinate (`g:a:1.4-redhat-00001`)
//!
//! # File Format
//!
//! The model is stored as pretty-printed JSON, `manipulation.json` by default:
//!
//! ```json
//! {
//!   "name": "root",
//!   "group": "org.acme",
//!   "version": "1.0-redhat-00001",
//!   "originalVersion": "1.0",
//!   "children": {
//!     "subA": {
//!       "name": "subA",
//!       "group": "org.acme",
//!       "version": "1.0-redhat-00001",
//!       "originalVersion": "1.0",
//!       "alignedDependencies": {
//!         "g:a:1.0": "g:a:1.0-redhat-1"
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! # Lookup
//!
//! Nodes are found by root-relative path (`:`, `:subA`, `:parent:child`) or by a bare
//! module name that is unique within the tree, see [`AlignmentModel::find`].

mod lookup;

use crate::coordinate::Coordinate;
use crate::core::AlignError;
use crate::utils::fs::{atomic_write, read_text_file};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub use lookup::ROOT_PATH;

/// Default file name of a serialized model.
pub const MODEL_FILE_NAME: &str = "manipulation.json";

/// One node of the alignment model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,

    #[serde(default)]
    pub group: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_version: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    aligned_dependencies: BTreeMap<String, Coordinate>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, Module>,
}

impl Module {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            ..Self::default()
        }
    }

    /// The aligned version, once assigned.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Assign the aligned version.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::VersionAlreadyAssigned`] when the version is already set.
    pub fn assign_version(&mut self, version: impl Into<String>, path: &str) -> Result<(), AlignError> {
        if self.version.is_some() {
            return Err(AlignError::VersionAlreadyAssigned {
                module: path.to_string(),
            });
        }
        self.version = Some(version.into());
        Ok(())
    }

    /// Original coordinate string → replacement coordinate.
    #[must_use]
    pub const fn aligned_dependencies(&self) -> &BTreeMap<String, Coordinate> {
        &self.aligned_dependencies
    }

    /// Record the replacement of one declared dependency.
    pub fn insert_aligned(&mut self, original: &Coordinate, replacement: Coordinate) {
        self.aligned_dependencies.insert(original.to_string(), replacement);
    }

    /// Replacement for a dependency declared as `original`, if any.
    #[must_use]
    pub fn aligned(&self, original: &str) -> Option<&Coordinate> {
        self.aligned_dependencies.get(original)
    }

    /// Child nodes keyed by path segment.
    #[must_use]
    pub const fn children(&self) -> &BTreeMap<String, Module> {
        &self.children
    }

    /// Coordinate of this module after alignment, when fully defined.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.version
            .as_ref()
            .map(|version| Coordinate::new(&self.group, &self.name, version))
    }
}

/// The hierarchical result of one alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlignmentModel {
    root: Module,
}

impl AlignmentModel {
    /// A model holding only the root module.
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            root: Module::new(name, group),
        }
    }

    #[must_use]
    pub const fn root(&self) -> &Module {
        &self.root
    }

    pub const fn root_mut(&mut self) -> &mut Module {
        &mut self.root
    }

    /// Add a module under an existing parent.
    ///
    /// `path` is root-relative (`:a`, `:a:b`); its last segment becomes the child key.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InvalidModelPath`] when the path is not nested, the parent
    /// does not exist, or the path is already taken.
    pub fn add_module(&mut self, path: &str, module: Module) -> Result<(), AlignError> {
        let invalid = |reason: &str| AlignError::InvalidModelPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let segments = lookup::segments(path).ok_or_else(|| invalid("paths start with ':'"))?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(invalid("the root module already exists"));
        };
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("path contains an empty segment"));
        }

        let mut parent = &mut self.root;
        for segment in parents {
            parent = parent
                .children
                .get_mut(*segment)
                .ok_or_else(|| invalid(&format!("parent module ':{}' does not exist", parents.join(":"))))?;
        }

        if parent.children.contains_key(*last) {
            return Err(invalid("a module with this path already exists"));
        }
        parent.children.insert((*last).to_string(), module);
        Ok(())
    }

    /// Root-relative paths of every node, root first, then depth-first by key.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        lookup::collect_paths(&self.root, ROOT_PATH, &mut paths);
        paths
    }

    /// Number of modules, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths().len()
    }

    /// A model always holds its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Load a model from disk.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not a valid model.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_text_file(path).with_context(|| {
            format!(
                "Cannot read alignment model: {}\n\n\
                 Run 'depalign align' to generate it",
                path.display()
            )
        })?;

        let model: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid alignment model: {}", path.display()))?;
        Ok(model)
    }

    /// Save the model as pretty-printed JSON, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content =
            serde_json::to_string_pretty(self).context("Failed to serialize alignment model")?;
        content.push('\n');
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Failed to write alignment model: {}", path.display()))
    }
}
