//! The alignment orchestrator: customizers around one authority call.

use super::customizer::{insert_ordered, RequestCustomizer, ResponseCustomizer};
use super::request::Request;
use super::response::Response;
use crate::coordinate::Coordinate;
use crate::core::AlignError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The remote source of aligned versions.
///
/// An implementation receives the flat, deduplicated list of coordinates and answers with
/// the replacement version of each one it knows. A missing entry means "no alignment
/// available" and is not an error.
pub trait AlignmentAuthority: Send + Sync {
    /// Translate coordinates to aligned versions.
    ///
    /// # Errors
    ///
    /// Returns an error when the authority cannot be reached or used at all.
    fn translate(&self, coordinates: &[Coordinate]) -> Result<HashMap<Coordinate, String>, AlignError>;
}

/// Whether the authority is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencySource {
    /// Ask the configured authority
    #[default]
    Rest,
    /// Never ask, every lookup falls through to overrides and pinned versions
    None,
}

impl fmt::Display for DependencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => f.write_str("rest"),
            Self::None => f.write_str("none"),
        }
    }
}

impl std::str::FromStr for DependencySource {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "none" => Ok(Self::None),
            other => Err(AlignError::ConfigError {
                message: format!("Unknown dependency source '{other}', expected 'rest' or 'none'"),
            }),
        }
    }
}

/// The request the authority saw, and the response after every customizer ran.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub request: Request,
    pub response: Response,
}

/// Result of [`Orchestrator::align`].
#[derive(Debug, Clone)]
pub enum AlignmentOutcome {
    /// The authority answered
    Aligned(Alignment),
    /// The dependency source is disabled; the response holds no translations but the
    /// response customizers still ran
    SkippedByPolicy(Alignment),
    /// The authority could not be used; nothing may be written
    Failed(AlignError),
}

impl AlignmentOutcome {
    /// The alignment for both successful cases.
    ///
    /// # Errors
    ///
    /// Returns the failure reason for [`AlignmentOutcome::Failed`].
    pub fn into_result(self) -> Result<Alignment, AlignError> {
        match self {
            Self::Aligned(alignment) | Self::SkippedByPolicy(alignment) => Ok(alignment),
            Self::Failed(e) => Err(e),
        }
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedByPolicy(_))
    }
}

/// Runs request customizers, the authority, then response customizers.
#[derive(Clone)]
pub struct Orchestrator {
    authority: Option<Arc<dyn AlignmentAuthority>>,
    source: DependencySource,
    request_customizers: Vec<RequestCustomizer>,
    response_customizers: Vec<ResponseCustomizer>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("authority", &self.authority.as_ref().map(|_| "<authority>"))
            .field("source", &self.source)
            .field("request_customizers", &self.request_customizers)
            .field("response_customizers", &self.response_customizers)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator without customizers.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::MissingAuthority`] when `source` is
    /// [`DependencySource::Rest`] and no authority is given.
    pub fn new(
        authority: Option<Arc<dyn AlignmentAuthority>>,
        source: DependencySource,
    ) -> Result<Self, AlignError> {
        if source == DependencySource::Rest && authority.is_none() {
            return Err(AlignError::MissingAuthority);
        }
        Ok(Self {
            authority,
            source,
            request_customizers: Vec::new(),
            response_customizers: Vec::new(),
        })
    }

    /// Register a request customizer.
    #[must_use]
    pub fn with_request_customizer(mut self, customizer: RequestCustomizer) -> Self {
        insert_ordered(&mut self.request_customizers, customizer, RequestCustomizer::order);
        self
    }

    /// Register a response customizer.
    #[must_use]
    pub fn with_response_customizer(mut self, customizer: ResponseCustomizer) -> Self {
        insert_ordered(&mut self.response_customizers, customizer, ResponseCustomizer::order);
        self
    }

    #[must_use]
    pub const fn source(&self) -> DependencySource {
        self.source
    }

    #[must_use]
    pub fn response_customizers(&self) -> &[ResponseCustomizer] {
        &self.response_customizers
    }

    /// Align one combined request.
    pub fn align(&self, request: Request) -> AlignmentOutcome {
        let request = self
            .request_customizers
            .iter()
            .fold(request, |request, customizer| customizer.customize(&request));

        let coordinates = request.authority_coordinates();
        info!(
            "Alignment request has {} project and {} dependency coordinates",
            request.project_coordinates.len(),
            coordinates.len() - request.project_coordinates.len().min(coordinates.len())
        );

        let (raw, skipped) = match (self.source, &self.authority) {
            (DependencySource::None, _) => {
                warn!("Dependency source is 'none', no dependencies will be aligned by the authority");
                (Response::empty(), true)
            }
            (DependencySource::Rest, Some(authority)) => match authority.translate(&coordinates) {
                Ok(translation) => {
                    info!("Authority returned {} aligned versions", translation.len());
                    debug!("Translation map: {:?}", translation);
                    (Response::from_translation(translation, &request.project_coordinates), false)
                }
                Err(e) => {
                    let reason = match e {
                        AlignError::AlignmentUnavailable {
                            reason,
                        } => reason,
                        other => other.to_string(),
                    };
                    return AlignmentOutcome::Failed(AlignError::AlignmentUnavailable {
                        reason,
                    });
                }
            },
            (DependencySource::Rest, None) => {
                return AlignmentOutcome::Failed(AlignError::MissingAuthority);
            }
        };

        let response = self
            .response_customizers
            .iter()
            .fold(raw, |response, customizer| customizer.customize(response, &request));

        let alignment = Alignment {
            request,
            response,
        };
        if skipped {
            AlignmentOutcome::SkippedByPolicy(alignment)
        } else {
            AlignmentOutcome::Aligned(alignment)
        }
    }
}
