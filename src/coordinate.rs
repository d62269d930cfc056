//! Artifact coordinates.
//!
//! A [`Coordinate`] is the `(group, artifact, version)` triple that identifies an external
//! dependency or a module of the build. Equality and hashing are structural, so coordinates
//! can key the translation map returned by the alignment authority.
//!
//! The string form is `group:artifact:version`. A coordinate with an empty version renders
//! as `group:artifact`, which is also how [`ProjectRef`] renders.

use crate::core::AlignError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An immutable `(group, artifact, version)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// The `group:artifact` part of this coordinate.
    #[must_use]
    pub fn project_ref(&self) -> ProjectRef {
        ProjectRef::new(&self.group, &self.artifact)
    }

    /// A copy of this coordinate with another version.
    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}:{}", self.group, self.artifact)
        } else {
            write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
        }
    }
}

impl FromStr for Coordinate {
    type Err = AlignError;

    /// Parses `group:artifact[:version]`.
    ///
    /// The artifact must be non-empty. An empty group is accepted because builds report
    /// group-less file dependencies that way; the barrier skips them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let invalid = |reason: &str| AlignError::ConfigError {
            message: format!("Invalid coordinate '{s}': {reason}"),
        };

        let (group, artifact, version) = match parts.as_slice() {
            [group, artifact] => (*group, *artifact, ""),
            [group, artifact, version] => (*group, *artifact, *version),
            _ => return Err(invalid("expected 'group:artifact[:version]'")),
        };
        if artifact.is_empty() {
            return Err(invalid("artifact must not be empty"));
        }
        Ok(Self::new(group, artifact, version))
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A `group:artifact` pair, used to identify the module that requested a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectRef {
    pub group: String,
    pub artifact: String,
}

impl ProjectRef {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

impl From<&Coordinate> for ProjectRef {
    fn from(coordinate: &Coordinate) -> Self {
        coordinate.project_ref()
    }
}

/// A dependency as a module declared it, plus the concrete coordinate the build resolved it to.
///
/// `resolved` is `None` when the build could not settle on a concrete version, e.g. a
/// `1.+` declaration that never resolved. Such a dependency is unresolvable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredDependency {
    pub declared: Coordinate,
    pub resolved: Option<Coordinate>,
}

impl DeclaredDependency {
    pub const fn new(declared: Coordinate, resolved: Option<Coordinate>) -> Self {
        Self {
            declared,
            resolved,
        }
    }

    /// True when the declared version is a range, `latest.*` or `x.+` selector.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        crate::version::is_dynamic(&self.declared.version)
    }
}

impl From<Coordinate> for DeclaredDependency {
    /// An exact declaration resolves to itself.
    fn from(coordinate: Coordinate) -> Self {
        Self {
            resolved: Some(coordinate.clone()),
            declared: coordinate,
        }
    }
}
