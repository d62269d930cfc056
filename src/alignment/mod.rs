//! The alignment pipeline.
//!
//! One alignment of a build runs through four stages, all inside a single call to
//! [`Orchestrator::align`]:
//!
//! 1. every [`RequestCustomizer`] in order, e.g. dependency exclusions
//! 2. one call to the [`AlignmentAuthority`] with the deduplicated union of project and
//!    dependency coordinates
//! 3. every [`ResponseCustomizer`] in order: project version, overrides, dynamic pinning
//! 4. the final [`Response`] is returned inside an [`AlignmentOutcome`]
//!
//! A disabled dependency source is reported as [`AlignmentOutcome::SkippedByPolicy`], not as
//! an error, so callers build the model with zero authority alignments.
//!
//! # Example
//!
//! ```rust
//! use depalign_cli::alignment::{
//!     DependencySource, ModuleRequest, Orchestrator, Request, ResponseCustomizer,
//! };
//! use depalign_cli::coordinate::{Coordinate, DeclaredDependency};
//! use depalign_cli::pattern::DependencyRule;
//!
//! let orchestrator = Orchestrator::new(None, DependencySource::None)?
//!     .with_response_customizer(ResponseCustomizer::Override {
//!         rules: vec![(DependencyRule::parse("g:b:*@*")?, "2.0-redhat-9".to_string())],
//!     });
//!
//! let owner = Coordinate::new("org.acme", "app", "1.0");
//! let request = Request::new(
//!     vec![owner.clone()],
//!     "1.0",
//!     vec![ModuleRequest::new(":", owner.clone(), vec![DeclaredDependency::from(Coordinate::new("g", "b", "2.0"))])],
//! );
//!
//! let alignment = orchestrator.align(request).into_result()?;
//! assert_eq!(
//!     alignment.response.aligned_version(&Coordinate::new("g", "b", "2.0"), &owner),
//!     Some("2.0-redhat-9")
//! );
//! # Ok::<(), depalign_cli::core::AlignError>(())
//! ```

pub mod customizer;
pub mod orchestrator;
pub mod request;
pub mod response;

pub use customizer::{
    ProjectVersionSettings, RequestCustomizer, ResponseCustomizer, DYNAMIC_INCLUSION_ORDER,
    PROJECT_VERSION_ORDER,
};
pub use orchestrator::{
    Alignment, AlignmentAuthority, AlignmentOutcome, DependencySource, Orchestrator,
};
pub use request::{ModuleRequest, Request};
pub use response::{OverrideLayer, Response};
