//! Request and response customizers.
//!
//! Customizers are small pure transformations that run around the authority call. Each one
//! carries an `order`; lower runs first and ties keep registration order. Request
//! customizers see the request before it is sent, response customizers see the raw
//! response together with the request that was actually sent.
//!
//! | Customizer | Side | Order |
//! |------------|------|-------|
//! | [`RequestCustomizer::Exclusion`] | request | 0 |
//! | [`ResponseCustomizer::ProjectVersion`] | response | -10 |
//! | [`ResponseCustomizer::Override`] | response | 0 |
//! | [`ResponseCustomizer::DynamicInclusion`] | response | `i32::MAX - 100` |

use super::request::{ModuleRequest, Request};
use super::response::{OverrideLayer, Response};
use crate::pattern::DependencyRule;
use crate::version;
use tracing::{debug, info};

/// Order of [`ResponseCustomizer::ProjectVersion`].
pub const PROJECT_VERSION_ORDER: i32 = -10;

/// Order of [`ResponseCustomizer::DynamicInclusion`].
pub const DYNAMIC_INCLUSION_ORDER: i32 = i32::MAX - 100;

/// Transformations applied to the request before the authority is called.
#[derive(Debug, Clone)]
pub enum RequestCustomizer {
    /// Drop every dependency matched by any of the rules, per requesting module.
    ///
    /// Project coordinates are never touched.
    Exclusion { rules: Vec<DependencyRule> },
}

impl RequestCustomizer {
    #[must_use]
    pub const fn order(&self) -> i32 {
        match self {
            Self::Exclusion { .. } => 0,
        }
    }

    /// Produce the customized request, leaving `request` untouched.
    #[must_use]
    pub fn customize(&self, request: &Request) -> Request {
        match self {
            Self::Exclusion {
                rules,
            } => {
                let modules = request
                    .modules
                    .iter()
                    .map(|module| {
                        let dependencies = module
                            .dependencies
                            .iter()
                            .filter(|dependency| {
                                let excluded = rules
                                    .iter()
                                    .find(|rule| rule.matches(&dependency.declared, &module.owner));
                                if let Some(rule) = excluded {
                                    debug!(
                                        "Excluding dependency {} from alignment of module {} (rule '{}')",
                                        dependency.declared,
                                        module.id,
                                        rule.key()
                                    );
                                }
                                excluded.is_none()
                            })
                            .cloned()
                            .collect();
                        ModuleRequest::new(module.id.clone(), module.owner.clone(), dependencies)
                    })
                    .collect();

                Request {
                    project_coordinates: request.project_coordinates.clone(),
                    project_version: request.project_version.clone(),
                    modules,
                }
            }
        }
    }
}

/// Settings for [`ResponseCustomizer::ProjectVersion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectVersionSettings {
    /// When false the project keeps the version the build declares
    pub enabled: bool,
    pub suffix: String,
    pub padding: usize,
    /// Keep `-SNAPSHOT` on the computed version instead of dropping it
    pub preserve_snapshot: bool,
    /// Replaces the computed version outright
    pub version_override: Option<String>,
    /// Project version of an earlier run; its counter is continued rather than restarted
    pub previous_version: Option<String>,
}

impl Default for ProjectVersionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            suffix: version::DEFAULT_SUFFIX.to_string(),
            padding: version::DEFAULT_PADDING,
            preserve_snapshot: false,
            version_override: None,
            previous_version: None,
        }
    }
}

impl ProjectVersionSettings {
    /// Compute the new project version.
    ///
    /// The authority's stated version is preferred as the input to suffixing, the build's
    /// declared version is the fallback. An earlier run's version on the same base counts as
    /// a further candidate, so repeated runs keep counting up.
    #[must_use]
    pub fn compute(&self, authority_version: Option<&str>, declared: &str) -> String {
        if !self.enabled {
            return declared.to_string();
        }
        if let Some(version_override) = &self.version_override {
            return version_override.clone();
        }

        let input = authority_version.unwrap_or(declared);
        let release = version::strip_snapshot(input);
        let candidates: Vec<&str> =
            self.previous_version.iter().map(|v| version::strip_snapshot(v)).collect();
        let next =
            version::next_version_with_candidates(release, &candidates, &self.suffix, self.padding);

        if self.preserve_snapshot && release.len() != input.len() {
            format!("{next}-SNAPSHOT")
        } else {
            next
        }
    }
}

/// Transformations applied to the authority's response.
#[derive(Debug, Clone)]
pub enum ResponseCustomizer {
    /// Pattern-based version overrides, checked before the translation map
    Override { rules: OverrideLayer },
    /// Computes the new project version
    ProjectVersion(ProjectVersionSettings),
    /// Pins dynamic dependencies the authority had no answer for to their resolved version
    DynamicInclusion,
}

impl ResponseCustomizer {
    #[must_use]
    pub const fn order(&self) -> i32 {
        match self {
            Self::Override { .. } => 0,
            Self::ProjectVersion(_) => PROJECT_VERSION_ORDER,
            Self::DynamicInclusion => DYNAMIC_INCLUSION_ORDER,
        }
    }

    /// Produce the customized response. `request` is the request the authority received.
    #[must_use]
    pub fn customize(&self, response: Response, request: &Request) -> Response {
        match self {
            Self::Override {
                rules,
            } => {
                debug!("Applying {} dependency override rule(s)", rules.len());
                response.push_override_layer(rules.clone())
            }
            Self::ProjectVersion(settings) => {
                let new_version =
                    settings.compute(response.raw_project_version(), &request.project_version);
                if settings.enabled {
                    info!(
                        "Project version {} will be updated to {}",
                        request.project_version, new_version
                    );
                } else {
                    info!(
                        "Version modification is disabled, keeping project version {}",
                        new_version
                    );
                }
                response.with_new_project_version(new_version)
            }
            Self::DynamicInclusion => {
                let dynamic = request.dynamic_dependencies();
                debug!("Pinning {} dynamic dependencies to their resolved versions", dynamic.len());
                response.with_pinned(dynamic)
            }
        }
    }
}

/// Insert keeping the list sorted by order, ties in registration order.
pub(crate) fn insert_ordered<T>(list: &mut Vec<T>, item: T, order: impl Fn(&T) -> i32) {
    list.push(item);
    list.sort_by_key(|c| order(c));
}
