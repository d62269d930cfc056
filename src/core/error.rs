//! Error handling for depalign
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`AlignError`]) for precise handling inside the engine
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Configuration**: [`AlignError::MalformedRule`], [`AlignError::ConfigError`],
//!   [`AlignError::MissingAuthority`]. Always fatal, raised before any module registers.
//! - **Unresolvable dependencies**: [`AlignError::UnresolvableDependency`]. Fatal unless the
//!   `ignore_unresolvable_dependencies` policy downgrades it to a warning.
//! - **Alignment unavailable**: [`AlignError::AlignmentUnavailable`]. The policy-disabled case is
//!   not an error at all, see [`crate::alignment::AlignmentOutcome::SkippedByPolicy`].
//! - **Model invariants**: [`AlignError::ModuleNotFound`], [`AlignError::AmbiguousModule`],
//!   [`AlignError::VersionAlreadyAssigned`], [`AlignError::InvalidModelPath`].
//! - **Barrier misuse**: [`AlignError::DuplicateRegistration`], [`AlignError::BarrierCompleted`],
//!   [`AlignError::AlignmentPending`], [`AlignError::BarrierPoisoned`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use depalign_cli::core::{AlignError, ErrorContext, user_friendly_error};
//!
//! fn lookup() -> Result<(), AlignError> {
//!     Err(AlignError::ModuleNotFound {
//!         name: ":sub".to_string(),
//!         suggestions: vec![":subA".to_string()],
//!     })
//! }
//!
//! if let Err(e) = lookup() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for alignment operations.
///
/// Each variant names one failure mode of the engine. Variants carry plain strings
/// rather than borrowed data so errors can cross the barrier's thread boundary and be
/// cloned into every waiting caller.
#[derive(Error, Debug)]
pub enum AlignError {
    /// A `dependencyOverride` / `dependencyExclusion` key could not be parsed.
    ///
    /// Every problem found in the key is listed, not just the first one.
    #[error("Malformed rule key '{key}': {}", problems.join("; "))]
    MalformedRule {
        /// The offending key, without its `dependencyOverride.` / `dependencyExclusion.` prefix
        key: String,
        /// Every problem found while parsing the key
        problems: Vec<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// No alignment authority configured while the dependency source requires one
    #[error("An alignment authority must be configured when dependency_source is 'rest'")]
    MissingAuthority,

    /// A module declared a dependency for which no concrete coordinate could be determined
    #[error("Module '{module}' has an unresolvable dependency: {dependency}")]
    UnresolvableDependency {
        /// Path of the module that declared the dependency
        module: String,
        /// The declared coordinate
        dependency: String,
    },

    /// The remote alignment authority could not be used
    #[error("Alignment authority unavailable: {reason}")]
    AlignmentUnavailable {
        /// Why the authority call failed
        reason: String,
    },

    /// A module path or name does not exist in the alignment model
    #[error("Module '{name}' does not exist in the alignment model")]
    ModuleNotFound {
        /// The path or name that was looked up
        name: String,
        /// Known module names close to the requested one
        suggestions: Vec<String>,
    },

    /// A bare module name matched more than one node of the model
    #[error("Module name '{name}' is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousModule {
        /// The bare name that was looked up
        name: String,
        /// Root-relative paths of every node with that name
        candidates: Vec<String>,
    },

    /// A module's version was assigned a second time
    #[error("Version of module '{module}' has already been assigned")]
    VersionAlreadyAssigned {
        /// Path of the module
        module: String,
    },

    /// A module path is not usable to build the model tree
    #[error("Invalid module path '{path}': {reason}")]
    InvalidModelPath {
        /// The offending path
        path: String,
        /// Why the path was rejected
        reason: String,
    },

    /// A module registered with the barrier twice
    #[error("Module '{module}' has already registered its dependencies")]
    DuplicateRegistration {
        /// Path of the module
        module: String,
    },

    /// A registration arrived after the barrier already fired
    #[error("Alignment has already been performed for this build")]
    BarrierCompleted,

    /// The finished model was requested before every module registered
    #[error("Alignment has not completed, {remaining} module(s) still have to register")]
    AlignmentPending {
        /// Number of modules that have not registered yet
        remaining: usize,
    },

    /// Another registration panicked while holding the barrier lock
    #[error("Alignment barrier state is poisoned")]
    BarrierPoisoned,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl AlignError {
    /// True for errors of the configuration category, which are never recovered.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRule { .. } | Self::ConfigError { .. } | Self::MissingAuthority
        )
    }
}

impl Clone for AlignError {
    fn clone(&self) -> Self {
        match self {
            Self::MalformedRule {
                key,
                problems,
            } => Self::MalformedRule {
                key: key.clone(),
                problems: problems.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::MissingAuthority => Self::MissingAuthority,
            Self::UnresolvableDependency {
                module,
                dependency,
            } => Self::UnresolvableDependency {
                module: module.clone(),
                dependency: dependency.clone(),
            },
            Self::AlignmentUnavailable {
                reason,
            } => Self::AlignmentUnavailable {
                reason: reason.clone(),
            },
            Self::ModuleNotFound {
                name,
                suggestions,
            } => Self::ModuleNotFound {
                name: name.clone(),
                suggestions: suggestions.clone(),
            },
            Self::AmbiguousModule {
                name,
                candidates,
            } => Self::AmbiguousModule {
                name: name.clone(),
                candidates: candidates.clone(),
            },
            Self::VersionAlreadyAssigned {
                module,
            } => Self::VersionAlreadyAssigned {
                module: module.clone(),
            },
            Self::InvalidModelPath {
                path,
                reason,
            } => Self::InvalidModelPath {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::DuplicateRegistration {
                module,
            } => Self::DuplicateRegistration {
                module: module.clone(),
            },
            Self::BarrierCompleted => Self::BarrierCompleted,
            Self::AlignmentPending {
                remaining,
            } => Self::AlignmentPending {
                remaining: *remaining,
            },
            Self::BarrierPoisoned => Self::BarrierPoisoned,
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: AlignError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: AlignError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions where one is known.
///
/// Downcasts to [`AlignError`] first, then to the IO, TOML and JSON errors that file
/// loading produces. Anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(align_error) = error.downcast_ref::<AlignError>() {
        return create_error_context(align_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(AlignError::Other {
                message: error_chain_message(&error),
            })
            .with_suggestion("Check that the file or directory exists and the path is correct");
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(AlignError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax. Verify quotes, brackets, and key names")
        .with_details("Rule keys containing ':' or '@' must be quoted in TOML tables");
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(AlignError::Other {
            message: json_error.to_string(),
        })
        .with_suggestion("The model file may be corrupted. Run 'depalign align --fresh' to regenerate it");
    }

    ErrorContext::new(AlignError::Other {
        message: error_chain_message(&error),
    })
}

fn error_chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();

    let chain: Vec<String> = error
        .chain()
        .skip(1) // Skip the root cause which is already in to_string()
        .map(std::string::ToString::to_string)
        .collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

fn create_error_context(error: AlignError) -> ErrorContext {
    match &error {
        AlignError::MalformedRule { .. } => ErrorContext::new(error)
            .with_suggestion("Rule keys have the form '<group>:<artifact>@<ownerGroup>:<ownerArtifact>', where any segment may be '*'")
            .with_details("Malformed rules are configuration errors and stop the build before any module is scanned"),

        AlignError::MissingAuthority => ErrorContext::new(error)
            .with_suggestion("Set 'authority' in depalign.toml, or set dependency_source = \"none\" to skip alignment")
            .with_details("The authority provides the aligned versions for every dependency of the build"),

        AlignError::UnresolvableDependency { .. } => ErrorContext::new(error)
            .with_suggestion("Add a 'resolved' coordinate for the dependency, or set ignore_unresolvable_dependencies = true")
            .with_details("Dynamic dependency versions must be resolved to a concrete version before alignment"),

        AlignError::AlignmentUnavailable { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the authority location is correct and readable")
            .with_details("No module of the alignment model was modified"),

        AlignError::ModuleNotFound { suggestions, .. } => {
            let suggestion = if suggestions.is_empty() {
                "Use a root-relative path such as ':sub' or ':parent:child'".to_string()
            } else {
                format!("Did you mean: {}?", suggestions.join(", "))
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        AlignError::AmbiguousModule { .. } => ErrorContext::new(error)
            .with_suggestion("Use the full root-relative path of the module instead of its bare name"),

        _ => ErrorContext::new(error),
    }
}
