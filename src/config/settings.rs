//! Alignment configuration (`depalign.toml`).
//!
//! ```toml
//! authority = "authority.toml"
//! dependency_source = "rest"
//! version_modification = true
//! version_incremental_suffix = "redhat"
//! version_incremental_suffix_padding = 5
//! version_suffix_snapshot = false
//! ignore_unresolvable_dependencies = false
//! report_non_aligned = false
//!
//! [dependency_override]
//! "org.hibernate:hibernate-core@*" = "5.3.7.Final-redhat-00001"
//!
//! [dependency_exclusion]
//! "org.mockito:*@org.acme:test" = ""
//!
//! [module_versions]
//! ":legacy" = "2.0.0-redhat-00001"
//! ```
//!
//! Rule tables keep their definition order, which decides precedence between rules that
//! match the same dependency.
//!
//! Any value can also be set from the command line as a property, see
//! [`AlignmentConfig::apply_properties`].

use crate::alignment::{
    AlignmentAuthority, DependencySource, OverrideLayer, Orchestrator, ProjectVersionSettings,
    RequestCustomizer, ResponseCustomizer,
};
use crate::barrier::BarrierPolicy;
use crate::core::AlignError;
use crate::model::AlignmentModel;
use crate::pattern::{parse_rules, DependencyRule};
use crate::version;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "depalign.toml";

/// Property prefix of override rules.
pub const OVERRIDE_PREFIX: &str = "dependencyOverride.";

/// Property prefix of exclusion rules.
pub const EXCLUSION_PREFIX: &str = "dependencyExclusion.";

/// Rule key → value pairs in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable(Vec<(String, String)>);

impl RuleTable {
    /// Set a rule, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RuleTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleTableVisitor;

        impl<'de> Visitor<'de> for RuleTableVisitor {
            type Value = RuleTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of rule keys to version strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = RuleTable::default();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    table.insert(key, value);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(RuleTableVisitor)
    }
}

/// Everything that steers one alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignmentConfig {
    /// Location of the translation table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    pub dependency_source: DependencySource,
    pub version_modification: bool,
    pub version_incremental_suffix: String,
    pub version_incremental_suffix_padding: usize,
    pub version_suffix_snapshot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_override: Option<String>,
    pub ignore_unresolvable_dependencies: bool,
    pub report_non_aligned: bool,
    pub dependency_override: RuleTable,
    pub dependency_exclusion: RuleTable,
    pub module_versions: BTreeMap<String, String>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            authority: None,
            dependency_source: DependencySource::Rest,
            version_modification: true,
            version_incremental_suffix: version::DEFAULT_SUFFIX.to_string(),
            version_incremental_suffix_padding: version::DEFAULT_PADDING,
            version_suffix_snapshot: false,
            version_override: None,
            ignore_unresolvable_dependencies: false,
            report_non_aligned: false,
            dependency_override: RuleTable::default(),
            dependency_exclusion: RuleTable::default(),
            module_versions: BTreeMap::new(),
        }
    }
}

/// Split a `key=value` property. A missing `=` means an empty value.
///
/// # Errors
///
/// Returns [`AlignError::ConfigError`] for an empty key.
pub fn parse_property(property: &str) -> Result<(String, String), AlignError> {
    let (key, value) = property.split_once('=').unwrap_or((property, ""));
    let key = key.trim();
    if key.is_empty() {
        return Err(AlignError::ConfigError {
            message: format!("Property '{property}' has no key"),
        });
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AlignError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "" => Ok(true),
        "false" => Ok(false),
        _ => Err(AlignError::ConfigError {
            message: format!("Property '{key}' expects true or false, got '{value}'"),
        }),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl AlignmentConfig {
    /// Load a configuration file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        super::parse_config(path)
    }

    /// Apply `key=value` properties on top of the loaded configuration.
    ///
    /// Accepted keys are the camelCase scalar names (`versionIncrementalSuffix`,
    /// `dependencySource`, ...), `dependencyOverride.<rule>` and
    /// `dependencyExclusion.<rule>`. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::ConfigError`] when a scalar value does not parse.
    pub fn apply_properties<'a>(
        &mut self,
        properties: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), AlignError> {
        for (key, value) in properties {
            if let Some(rule) = key.strip_prefix(OVERRIDE_PREFIX) {
                self.dependency_override.insert(rule, value);
                continue;
            }
            if let Some(rule) = key.strip_prefix(EXCLUSION_PREFIX) {
                self.dependency_exclusion.insert(rule, value);
                continue;
            }

            match key {
                "authority" => self.authority = non_empty(value),
                "dependencySource" => self.dependency_source = value.parse()?,
                "versionModification" => self.version_modification = parse_bool(key, value)?,
                "versionIncrementalSuffix" => self.version_incremental_suffix = value.to_string(),
                "versionIncrementalSuffixPadding" => {
                    self.version_incremental_suffix_padding =
                        value.parse().map_err(|_| AlignError::ConfigError {
                            message: format!("Property '{key}' expects a number, got '{value}'"),
                        })?;
                }
                "versionSuffixSnapshot" => self.version_suffix_snapshot = parse_bool(key, value)?,
                "versionOverride" => self.version_override = non_empty(value),
                "ignoreUnresolvableDependencies" => {
                    self.ignore_unresolvable_dependencies = parse_bool(key, value)?;
                }
                "reportNonAligned" => self.report_non_aligned = parse_bool(key, value)?,
                _ => debug!("Ignoring unknown property '{}'", key),
            }
        }
        Ok(())
    }

    /// Check the configuration before any module registers.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::MalformedRule`] listing every malformed rule key,
    /// [`AlignError::MissingAuthority`] when the source needs an authority and none is set,
    /// or [`AlignError::ConfigError`] for invalid suffix settings.
    pub fn validate(&self) -> Result<(), AlignError> {
        let all_rules = self
            .dependency_override
            .iter()
            .chain(self.dependency_exclusion.iter())
            .map(|(key, _)| (key, ()));
        parse_rules(all_rules)?;

        let padding = self.version_incremental_suffix_padding;
        if padding == 0 || padding > version::MAX_PADDING {
            return Err(AlignError::ConfigError {
                message: format!(
                    "version_incremental_suffix_padding must be between 1 and {}, got {padding}",
                    version::MAX_PADDING
                ),
            });
        }
        let suffix = &self.version_incremental_suffix;
        if suffix.trim().is_empty() || suffix.contains('-') {
            return Err(AlignError::ConfigError {
                message: format!(
                    "version_incremental_suffix '{suffix}' must be non-empty and must not contain '-'"
                ),
            });
        }
        if self.dependency_source == DependencySource::Rest && self.authority.is_none() {
            return Err(AlignError::MissingAuthority);
        }
        Ok(())
    }

    /// Override rules in definition order.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::MalformedRule`] for malformed keys.
    pub fn override_rules(&self) -> Result<OverrideLayer, AlignError> {
        parse_rules(self.dependency_override.iter().map(|(k, v)| (k, v.to_string())))
    }

    /// Exclusion rules in definition order.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::MalformedRule`] for malformed keys.
    pub fn exclusion_rules(&self) -> Result<Vec<DependencyRule>, AlignError> {
        let rules = parse_rules(self.dependency_exclusion.iter())?;
        Ok(rules.into_iter().map(|(rule, _)| rule).collect())
    }

    /// Authority location, relative paths resolved against `base_dir`.
    #[must_use]
    pub fn authority_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.authority.as_ref().map(|location| base_dir.join(location))
    }

    /// Project version settings, continuing from the root version of `previous` if given.
    #[must_use]
    pub fn project_version_settings(
        &self,
        previous: Option<&AlignmentModel>,
    ) -> ProjectVersionSettings {
        ProjectVersionSettings {
            enabled: self.version_modification,
            suffix: self.version_incremental_suffix.clone(),
            padding: self.version_incremental_suffix_padding,
            preserve_snapshot: self.version_suffix_snapshot,
            version_override: self.version_override.clone(),
            previous_version: previous.and_then(|model| model.root().version()).map(str::to_string),
        }
    }

    #[must_use]
    pub fn barrier_policy(&self) -> BarrierPolicy {
        BarrierPolicy {
            ignore_unresolvable_dependencies: self.ignore_unresolvable_dependencies,
            version_modification: self.version_modification,
            preserve_snapshot: self.version_suffix_snapshot,
            module_versions: self.module_versions.clone(),
        }
    }

    /// Build the orchestrator with every customizer this configuration asks for.
    ///
    /// `previous` is the model of an earlier run, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a rule is malformed or the authority is missing.
    pub fn orchestrator(
        &self,
        authority: Option<Arc<dyn AlignmentAuthority>>,
        previous: Option<&AlignmentModel>,
    ) -> Result<Orchestrator, AlignError> {
        let authority = match self.dependency_source {
            DependencySource::Rest => authority,
            DependencySource::None => None,
        };

        let exclusions = self.exclusion_rules()?;
        let overrides = self.override_rules()?;

        let mut orchestrator = Orchestrator::new(authority, self.dependency_source)?
            .with_response_customizer(ResponseCustomizer::ProjectVersion(
                self.project_version_settings(previous),
            ))
            .with_response_customizer(ResponseCustomizer::DynamicInclusion);

        if !exclusions.is_empty() {
            orchestrator = orchestrator.with_request_customizer(RequestCustomizer::Exclusion {
                rules: exclusions,
            });
        }

        if !overrides.is_empty() {
            orchestrator =
                orchestrator.with_response_customizer(ResponseCustomizer::Override {
                    rules: overrides,
                });
        }

        Ok(orchestrator)
    }
}
