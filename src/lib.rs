//! depalign - dependency-version alignment for multi-module builds
//!
//! Every module of a build declares external dependencies with its own versions. depalign
//! collects those declarations from all modules, asks a single alignment authority once for
//! policy-approved replacement versions, and records the decision in an alignment model that
//! every module then reads. Modules built together end up with one consistent set of
//! dependency versions and a new, suffixed project version.
//!
//! # Architecture Overview
//!
//! ```text
//! module A ──┐
//! module B ──┼─ register ─→ AlignmentBarrier ─(last module)─→ Orchestrator ─→ AlignmentModel
//! module C ──┘                                   │
//!                               request customizers → authority → response customizers
//! ```
//!
//! - The [`barrier`] accepts one registration per module from any thread. The registration
//!   that completes the set runs the alignment itself, so the authority is called at most
//!   once per build and no module ever waits.
//! - The [`alignment`] pipeline applies exclusions, calls the authority, then computes the
//!   project version, applies overrides and pins dynamic dependencies.
//! - The [`model`] is written in one step after the pipeline succeeds, or not at all.
//!
//! # Core Modules
//!
//! ## Domain
//! - [`coordinate`] - `group:artifact:version` coordinates and declared dependencies
//! - [`pattern`] - override and exclusion rule keys (`g:a@og:oa`, with `*` wildcards)
//! - [`version`] - the incremental suffix algorithm and dynamic version detection
//! - [`alignment`] - requests, responses, customizers and the orchestrator
//! - [`barrier`] - the aggregation barrier
//! - [`model`] - the hierarchical alignment model, its lookup and JSON form
//!
//! ## Collaborators
//! - [`authority`] - translation-table authorities
//! - [`config`] - `depalign.toml` and build descriptions
//! - [`report`] - text and JSON change reports
//!
//! ## Supporting Modules
//! - [`cli`] - the `depalign` command line
//! - [`core`] - error types and user-facing error rendering
//! - [`utils`] - atomic file writes
//!
//! # Configuration (depalign.toml)
//!
//! ```toml
//! authority = "authority.toml"
//! version_incremental_suffix = "redhat"
//! version_incremental_suffix_padding = 5
//!
//! [dependency_override]
//! "org.hibernate:hibernate-core@*" = "5.3.7.Final-redhat-00001"
//!
//! [dependency_exclusion]
//! "org.mockito:*@*" = ""
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Align a build described in build.toml, writing manipulation.json
//! depalign align --build build.toml
//!
//! # Same, with a property override and a report
//! depalign align --build build.toml -D versionIncrementalSuffix=temporary --report report.txt
//!
//! # Inspect the result
//! depalign show manipulation.json --module subA
//! ```

pub mod alignment;
pub mod authority;
pub mod barrier;
pub mod cli;
pub mod config;
pub mod coordinate;
pub mod core;
pub mod model;
pub mod pattern;
pub mod report;
pub mod utils;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
