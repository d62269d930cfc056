//! The combined alignment request.

use crate::coordinate::{Coordinate, DeclaredDependency, ProjectRef};
use std::collections::HashSet;

/// Dependencies one module contributes to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    /// Root-relative module path, `:` for the root
    pub id: String,
    /// The module's own coordinate, used to scope owner-specific rules
    pub owner: Coordinate,
    /// External dependencies, every one of them resolved
    pub dependencies: Vec<DeclaredDependency>,
}

impl ModuleRequest {
    pub fn new(id: impl Into<String>, owner: Coordinate, dependencies: Vec<DeclaredDependency>) -> Self {
        Self {
            id: id.into(),
            owner,
            dependencies,
        }
    }

    /// Resolved coordinates of this module's dependencies.
    pub fn resolved(&self) -> impl Iterator<Item = &Coordinate> {
        self.dependencies.iter().filter_map(|d| d.resolved.as_ref())
    }
}

/// Everything the build asks the authority about, in one value.
///
/// The flat `dependency_coordinates` view sent to the authority is derived from the
/// per-module lists, so excluding a dependency from one module leaves it in the request
/// when another module still needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Coordinates of the root project and of every fully-defined module, root first
    pub project_coordinates: Vec<Coordinate>,
    /// Version the build declares for the project, the input to suffixing when the
    /// authority has no opinion
    pub project_version: String,
    pub modules: Vec<ModuleRequest>,
}

impl Request {
    pub fn new(
        project_coordinates: Vec<Coordinate>,
        project_version: impl Into<String>,
        modules: Vec<ModuleRequest>,
    ) -> Self {
        Self {
            project_coordinates,
            project_version: project_version.into(),
            modules,
        }
    }

    /// Deduplicated union of every module's resolved dependencies, in first-seen order.
    #[must_use]
    pub fn dependency_coordinates(&self) -> Vec<Coordinate> {
        let mut seen = HashSet::new();
        self.modules
            .iter()
            .flat_map(ModuleRequest::resolved)
            .filter(|c| seen.insert(*c))
            .cloned()
            .collect()
    }

    /// Deduplicated union of project and dependency coordinates: what the authority sees.
    #[must_use]
    pub fn authority_coordinates(&self) -> Vec<Coordinate> {
        let mut seen: HashSet<Coordinate> = HashSet::new();
        self.project_coordinates
            .iter()
            .cloned()
            .chain(self.dependency_coordinates())
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }

    /// Resolved coordinates of every dependency declared with a dynamic selector.
    #[must_use]
    pub fn dynamic_dependencies(&self) -> HashSet<Coordinate> {
        self.modules
            .iter()
            .flat_map(|m| m.dependencies.iter())
            .filter(|d| d.is_dynamic())
            .filter_map(|d| d.resolved.clone())
            .collect()
    }

    /// The `group:artifact` of every module taking part in the build.
    #[must_use]
    pub fn module_refs(&self) -> HashSet<ProjectRef> {
        self.modules.iter().map(|m| m.owner.project_ref()).collect()
    }

    /// Total number of dependency entries across modules, before deduplication.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.modules.iter().map(|m| m.dependencies.len()).sum()
    }
}
