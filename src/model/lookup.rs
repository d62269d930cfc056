//! Node lookup by path or bare name.

use super::{AlignmentModel, Module};
use crate::core::AlignError;
use strsim::levenshtein;

/// Path of the root module.
pub const ROOT_PATH: &str = ":";

/// Maximum edit distance, as a percentage of the query length, for a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Split a root-relative path into segments; `None` when it is not root-relative.
pub(super) fn segments(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix(':')?;
    if rest.is_empty() {
        return Some(Vec::new());
    }
    Some(rest.split(':').collect())
}

fn child_path(parent: &str, key: &str) -> String {
    if parent == ROOT_PATH {
        format!(":{key}")
    } else {
        format!("{parent}:{key}")
    }
}

pub(super) fn collect_paths(module: &Module, path: &str, out: &mut Vec<String>) {
    out.push(path.to_string());
    for (key, child) in &module.children {
        collect_paths(child, &child_path(path, key), out);
    }
}

fn collect_named(module: &Module, path: &str, name: &str, out: &mut Vec<String>) {
    if module.name == name {
        out.push(path.to_string());
    }
    for (key, child) in &module.children {
        collect_named(child, &child_path(path, key), name, out);
    }
}

impl AlignmentModel {
    /// Find a module by root-relative path or by unique bare name.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::ModuleNotFound`], with close names as suggestions, when nothing
    /// matches, and [`AlignError::AmbiguousModule`] when a bare name matches several nodes.
    pub fn find(&self, query: &str) -> Result<&Module, AlignError> {
        let path = self.resolve(query)?;
        let mut module = &self.root;
        for segment in segments(&path).unwrap_or_default() {
            module = module
                .children
                .get(segment)
                .ok_or_else(|| self.not_found(query))?;
        }
        Ok(module)
    }

    /// Mutable variant of [`AlignmentModel::find`].
    ///
    /// # Errors
    ///
    /// Same as [`AlignmentModel::find`].
    pub fn find_mut(&mut self, query: &str) -> Result<&mut Module, AlignError> {
        let path = self.resolve(query)?;
        let not_found = self.not_found(query);
        let mut module = &mut self.root;
        for segment in segments(&path).unwrap_or_default() {
            module = module.children.get_mut(segment).ok_or_else(|| not_found.clone())?;
        }
        Ok(module)
    }

    /// The root-relative path `query` refers to.
    ///
    /// # Errors
    ///
    /// Same as [`AlignmentModel::find`].
    pub fn resolve(&self, query: &str) -> Result<String, AlignError> {
        let query = query.trim();

        if query.starts_with(':') {
            return match self.find_by_path(query) {
                Some(_) => Ok(query.to_string()),
                None => Err(self.not_found(query)),
            };
        }

        let mut matches = Vec::new();
        collect_named(&self.root, ROOT_PATH, query, &mut matches);
        match matches.len() {
            0 => Err(self.not_found(query)),
            1 => Ok(matches.remove(0)),
            _ => Err(AlignError::AmbiguousModule {
                name: query.to_string(),
                candidates: matches,
            }),
        }
    }

    fn not_found(&self, query: &str) -> AlignError {
        AlignError::ModuleNotFound {
            name: query.to_string(),
            suggestions: self.suggestions(query),
        }
    }

    /// Up to three known paths or names close to `query`.
    fn suggestions(&self, query: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        collect_paths(&self.root, ROOT_PATH, &mut candidates);
        let names: Vec<String> = candidates
            .iter()
            .filter_map(|path| self.find_by_path(path).map(|m| m.name.clone()))
            .collect();
        candidates.extend(names);
        candidates.sort();
        candidates.dedup();

        let limit = (query.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        let mut scored: Vec<(String, usize)> = candidates
            .into_iter()
            .map(|candidate| {
                let distance = levenshtein(query, &candidate);
                (candidate, distance)
            })
            .filter(|(_, distance)| *distance <= limit)
            .collect();

        scored.sort_by_key(|(_, distance)| *distance);
        scored.into_iter().take(3).map(|(candidate, _)| candidate).collect()
    }

    fn find_by_path(&self, path: &str) -> Option<&Module> {
        let mut module = &self.root;
        for segment in segments(path)? {
            module = module.children.get(segment)?;
        }
        Some(module)
    }
}
