//! Version string helpers for alignment.
//!
//! Versions in a build are opaque strings: the engine never orders or compares them. It only
//! needs to answer three questions about a version:
//!
//! - [`next_version`] - what the next suffixed release of a version is
//!   (`5.0.2.RELEASE` → `5.0.2.RELEASE-redhat-00001`)
//! - [`is_dynamic`] - whether a declared version is a selector (`1.+`, `latest.release`,
//!   `[1.0,2.0)`) rather than a concrete version
//! - [`strip_snapshot`] - the release form of a `-SNAPSHOT` version
//!
//! # Module Organization
//!
//! - [`suffix`] - the incremental suffix algorithm
//! - [`dynamic`] - dynamic selector detection and snapshot handling

pub mod dynamic;
pub mod suffix;

pub use dynamic::{is_dynamic, is_unspecified, strip_snapshot, UNSPECIFIED};
pub use suffix::{next_version, next_version_with_candidates};

/// Default suffix token appended by [`next_version`].
pub const DEFAULT_SUFFIX: &str = "redhat";

/// Default zero-padding width of the suffix counter.
pub const DEFAULT_PADDING: usize = 5;

/// Widest zero-padding accepted for the suffix counter.
pub const MAX_PADDING: usize = 32;
