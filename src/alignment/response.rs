//! The alignment response and its lookup rules.

use crate::coordinate::Coordinate;
use crate::pattern::DependencyRule;
use std::collections::{HashMap, HashSet};

/// One override customizer's rules, in definition order.
pub type OverrideLayer = Vec<(DependencyRule, String)>;

/// The authority's answer, as shaped by the response customizers.
///
/// The raw translation map is private: after the pipeline has run, the only way to change
/// what a lookup returns is to run another response customizer.
#[derive(Debug, Clone, Default)]
pub struct Response {
    translation_map: HashMap<Coordinate, String>,
    override_layers: Vec<OverrideLayer>,
    pinned: HashSet<Coordinate>,
    raw_project_version: Option<String>,
    new_project_version: Option<String>,
}

impl Response {
    /// Wrap the authority's translation map.
    ///
    /// The authority's stated project version is the translation of the first project
    /// coordinate.
    #[must_use]
    pub fn from_translation(
        translation_map: HashMap<Coordinate, String>,
        project_coordinates: &[Coordinate],
    ) -> Self {
        let raw_project_version = project_coordinates
            .first()
            .and_then(|project| translation_map.get(project))
            .filter(|version| !version.trim().is_empty())
            .cloned();

        Self {
            translation_map,
            raw_project_version,
            ..Self::default()
        }
    }

    /// A response that aligns nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aligned version of `coordinate` as requested by the module `owner`.
    ///
    /// Lookup order:
    /// 1. override layers, most recently applied first; inside a layer the first matching
    ///    rule in definition order wins and rules with an empty value are skipped
    /// 2. the authority's translation map
    /// 3. the build-resolved version of a dynamic dependency
    ///
    /// `None` means no alignment is available.
    #[must_use]
    pub fn aligned_version(&self, coordinate: &Coordinate, owner: &Coordinate) -> Option<&str> {
        let overridden = self.override_layers.iter().rev().find_map(|layer| {
            layer
                .iter()
                .find(|(rule, value)| !value.is_empty() && rule.matches(coordinate, owner))
                .map(|(_, value)| value.as_str())
        });
        if overridden.is_some() {
            return overridden;
        }

        if let Some(version) = self.translation_map.get(coordinate) {
            if !version.trim().is_empty() {
                return Some(version.as_str());
            }
        }

        self.pinned.get(coordinate).map(|pinned| pinned.version.as_str())
    }

    /// The translation map exactly as the authority returned it.
    #[must_use]
    pub const fn translation_map(&self) -> &HashMap<Coordinate, String> {
        &self.translation_map
    }

    /// The authority's stated project version, if it had one.
    #[must_use]
    pub fn raw_project_version(&self) -> Option<&str> {
        self.raw_project_version.as_deref()
    }

    #[must_use]
    pub fn new_project_version(&self) -> Option<&str> {
        self.new_project_version.as_deref()
    }

    pub(crate) fn push_override_layer(mut self, layer: OverrideLayer) -> Self {
        self.override_layers.push(layer);
        self
    }

    pub(crate) fn with_pinned(mut self, pinned: HashSet<Coordinate>) -> Self {
        self.pinned.extend(pinned);
        self
    }

    pub(crate) fn with_new_project_version(mut self, version: impl Into<String>) -> Self {
        self.new_project_version = Some(version.into());
        self
    }
}
