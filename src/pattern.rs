//! Wildcard coordinate rules for `dependencyOverride` and `dependencyExclusion`.
//!
//! A rule key names a dependency pattern and the module the rule applies to, separated by
//! exactly one `@`:
//!
//! ```text
//! <group>[:<artifact>[:<version>]]@<ownerGroup>:<ownerArtifact>
//! <group>[:<artifact>[:<version>]]@*
//! ```
//!
//! Every segment is either a literal or the wildcard token `*`. A missing artifact segment
//! means "any artifact". The version segment is accepted for symmetry with coordinates but
//! never takes part in matching: a rule addresses a dependency irrespective of the version
//! it is currently declared with.
//!
//! # Examples
//!
//! ```rust
//! use depalign_cli::coordinate::Coordinate;
//! use depalign_cli::pattern::DependencyRule;
//!
//! let rule = DependencyRule::parse("org.mockito:*@org.acme:test").unwrap();
//! let mockito = Coordinate::new("org.mockito", "mockito-core", "4.0.0");
//!
//! assert!(rule.matches(&mockito, &Coordinate::new("org.acme", "test", "1.0")));
//! assert!(!rule.matches(&mockito, &Coordinate::new("org.acme", "app", "1.0")));
//! ```
//!
//! # Error Reporting
//!
//! [`DependencyRule::parse`] validates the whole key in a single pass and returns every
//! problem it finds in one [`AlignError::MalformedRule`].

use crate::coordinate::{Coordinate, ProjectRef};
use crate::core::AlignError;
use std::fmt;

/// The wildcard token.
pub const WILDCARD: &str = "*";

/// One segment of a rule pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Wildcard,
}

impl Segment {
    /// Whether `value` is accepted by this segment.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Literal(literal) => literal == value,
        }
    }

    fn parse(raw: &str, slot: &str, problems: &mut Vec<String>) -> Self {
        if raw == WILDCARD {
            return Self::Wildcard;
        }
        if raw.is_empty() {
            problems.push(format!("{slot} segment is empty"));
        } else if raw.contains('*') {
            problems.push(format!(
                "{slot} segment '{raw}' mixes '*' with other characters, use a lone '*' instead"
            ));
        } else if raw.chars().any(char::is_whitespace) {
            problems.push(format!("{slot} segment '{raw}' contains whitespace"));
        }
        Self::Literal(raw.to_string())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str(WILDCARD),
            Self::Literal(literal) => f.write_str(literal),
        }
    }
}

/// The dependency half of a rule key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinatePattern {
    pub group: Segment,
    pub artifact: Segment,
    /// Parsed but ignored when matching.
    pub version: Segment,
}

impl CoordinatePattern {
    /// Match on group and artifact only.
    #[must_use]
    pub fn matches(&self, candidate: &Coordinate) -> bool {
        self.group.matches(&candidate.group) && self.artifact.matches(&candidate.artifact)
    }

    fn parse(raw: &str, problems: &mut Vec<String>) -> Self {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() > 3 {
            problems.push(format!(
                "dependency pattern '{raw}' has {} segments, expected at most group:artifact:version",
                parts.len()
            ));
        }

        let group = Segment::parse(parts[0], "group", problems);
        let artifact = match parts.get(1) {
            Some(artifact) => Segment::parse(artifact, "artifact", problems),
            None => Segment::Wildcard,
        };
        let version = match parts.get(2) {
            Some(version) => Segment::parse(version, "version", problems),
            None => Segment::Wildcard,
        };

        Self {
            group,
            artifact,
            version,
        }
    }
}

impl fmt::Display for CoordinatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if self.version != Segment::Wildcard {
            write!(f, ":{}", self.version)?;
        }
        Ok(())
    }
}

/// The module half of a rule key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerPattern {
    /// `@*`, the rule applies to every module
    Any,
    /// `@group:artifact`, each side literal or wildcard
    Module {
        group: Segment,
        artifact: Segment,
    },
}

impl OwnerPattern {
    /// Match on the owning module's group and artifact, its version is ignored.
    #[must_use]
    pub fn matches(&self, owner: &ProjectRef) -> bool {
        match self {
            Self::Any => true,
            Self::Module {
                group,
                artifact,
            } => group.matches(&owner.group) && artifact.matches(&owner.artifact),
        }
    }

    fn parse(raw: &str, problems: &mut Vec<String>) -> Self {
        if raw == WILDCARD {
            return Self::Any;
        }

        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 2 {
            problems.push(format!(
                "module pattern '{raw}' must be '*' or 'group:artifact'"
            ));
        }

        let group = Segment::parse(parts[0], "module group", problems);
        let artifact = match parts.get(1) {
            Some(artifact) => Segment::parse(artifact, "module artifact", problems),
            None => Segment::Wildcard,
        };

        Self::Module {
            group,
            artifact,
        }
    }
}

impl fmt::Display for OwnerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Module {
                group,
                artifact,
            } => write!(f, "{group}:{artifact}"),
        }
    }
}

/// A parsed `dependency@module` rule key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyRule {
    key: String,
    pub pattern: CoordinatePattern,
    pub owner: OwnerPattern,
}

impl DependencyRule {
    /// Parse a rule key such as `org.hibernate:hibernate-core@*`.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::MalformedRule`] listing every problem when the key does not
    /// contain exactly one `@` or either half is not a valid pattern.
    pub fn parse(key: &str) -> Result<Self, AlignError> {
        let mut problems = Vec::new();

        let halves: Vec<&str> = key.split('@').collect();
        let (dependency, owner) = match halves.as_slice() {
            [dependency, owner] => (*dependency, *owner),
            [_] => {
                return Err(AlignError::MalformedRule {
                    key: key.to_string(),
                    problems: vec!["missing '@' between dependency and module patterns".into()],
                });
            }
            _ => {
                return Err(AlignError::MalformedRule {
                    key: key.to_string(),
                    problems: vec![format!(
                        "expected exactly one '@', found {}",
                        halves.len() - 1
                    )],
                });
            }
        };

        let pattern = CoordinatePattern::parse(dependency, &mut problems);
        let owner = OwnerPattern::parse(owner, &mut problems);

        if !problems.is_empty() {
            return Err(AlignError::MalformedRule {
                key: key.to_string(),
                problems,
            });
        }

        Ok(Self {
            key: key.to_string(),
            pattern,
            owner,
        })
    }

    /// The key this rule was parsed from.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether `candidate`, requested by the module `owner`, falls under this rule.
    #[must_use]
    pub fn matches(&self, candidate: &Coordinate, owner: &Coordinate) -> bool {
        self.applies_to(&owner.project_ref()) && self.pattern.matches(candidate)
    }

    /// Whether this rule applies to dependencies of `owner`.
    #[must_use]
    pub fn applies_to(&self, owner: &ProjectRef) -> bool {
        self.owner.matches(owner)
    }
}

impl fmt::Display for DependencyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.pattern, self.owner)
    }
}

/// Parse a batch of rule keys, keeping their order.
///
/// Every key is parsed even after a failure so that one error lists all malformed keys.
///
/// # Errors
///
/// Returns the single [`AlignError::MalformedRule`] when one key is malformed, or a
/// combined one naming every malformed key otherwise.
pub fn parse_rules<'a, V: Clone>(
    entries: impl IntoIterator<Item = (&'a str, V)>,
) -> Result<Vec<(DependencyRule, V)>, AlignError> {
    let mut rules = Vec::new();
    let mut failures = Vec::new();

    for (key, value) in entries {
        match DependencyRule::parse(key) {
            Ok(rule) => rules.push((rule, value)),
            Err(e) => failures.push(e),
        }
    }

    match failures.len() {
        0 => Ok(rules),
        1 => Err(failures.remove(0)),
        _ => {
            let mut keys = Vec::with_capacity(failures.len());
            let mut problems = Vec::with_capacity(failures.len());
            for failure in failures {
                if let AlignError::MalformedRule {
                    key,
                    problems: key_problems,
                } = failure
                {
                    problems.push(format!("{key}: {}", key_problems.join(", ")));
                    keys.push(key);
                }
            }
            Err(AlignError::MalformedRule {
                key: keys.join(", "),
                problems,
            })
        }
    }
}
