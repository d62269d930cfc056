//! Test utilities for depalign.
//!
//! Shared by the unit tests and, through the `test-utils` feature, by the integration and
//! property test targets:
//!
//! - [`init_test_logging`] installs a test-friendly tracing subscriber once per process
//! - the fixture helpers build the three-module build used across the pipeline tests
//!
//! # Example
//!
//! ```rust,ignore
//! use depalign_cli::test_utils::{init_test_logging, scenario_build, scenario_authority};
//!
//! #[test]
//! fn aligns_the_scenario() {
//!     init_test_logging(None);
//!     let build = scenario_build();
//!     let authority = scenario_authority();
//!     // ...
//! }
//! ```

use crate::alignment::{DependencySource, Orchestrator, ResponseCustomizer};
use crate::authority::TranslationTable;
use crate::barrier::{AlignmentBarrier, BarrierPolicy, Registration};
use crate::config::{BuildDescription, DependencyDescription, ModuleDescription};
use crate::coordinate::{Coordinate, DeclaredDependency};
use crate::pattern::DependencyRule;
use std::sync::{Arc, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging once.
///
/// With `Some(level)` that level is used. With `None`, `RUST_LOG` decides, and without it
/// nothing is installed so test output stays quiet.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Parse a `g:a:v` literal.
///
/// # Panics
///
/// Panics on a malformed coordinate.
#[must_use]
pub fn coordinate(value: &str) -> Coordinate {
    value.parse().unwrap_or_else(|e| panic!("bad test coordinate '{value}': {e}"))
}

/// A registration whose dependencies are exact coordinates.
#[must_use]
pub fn registration(module: &str, owner: &str, dependencies: &[&str]) -> Registration {
    Registration::new(
        module,
        coordinate(owner),
        dependencies.iter().map(|d| DeclaredDependency::from(coordinate(d))).collect(),
    )
}

fn module(path: &str, dependencies: &[&str]) -> ModuleDescription {
    ModuleDescription {
        path: path.to_string(),
        dependencies: dependencies
            .iter()
            .map(|d| DependencyDescription::Simple((*d).to_string()))
            .collect(),
        ..ModuleDescription::default()
    }
}

/// Root without dependencies, `:subA` on `g:a:1.0`, `:subB` on `g:a:1.0` and `g:b:2.0`.
#[must_use]
pub fn scenario_build() -> BuildDescription {
    BuildDescription {
        root: ModuleDescription {
            name: Some("root".to_string()),
            group: Some("org.acme".to_string()),
            version: Some("1.0".to_string()),
            ..ModuleDescription::default()
        },
        modules: vec![module(":subA", &["g:a:1.0"]), module(":subB", &["g:a:1.0", "g:b:2.0"])],
    }
}

/// Knows `g:a:1.0` and nothing about `g:b:2.0`.
#[must_use]
pub fn scenario_authority() -> TranslationTable {
    TranslationTable::new().with(coordinate("g:a:1.0"), "1.0-redhat-1")
}

/// The `g:b:*@*` → `2.0-redhat-9` override.
#[must_use]
pub fn scenario_override() -> ResponseCustomizer {
    let rule = DependencyRule::parse("g:b:*@*").unwrap_or_else(|e| panic!("{e}"));
    ResponseCustomizer::Override {
        rules: vec![(rule, "2.0-redhat-9".to_string())],
    }
}

/// A barrier over [`scenario_build`] with the scenario authority and override.
///
/// # Panics
///
/// Panics when the scenario fixture is inconsistent.
#[must_use]
pub fn scenario_barrier() -> Arc<AlignmentBarrier> {
    let model = scenario_build().to_model().unwrap_or_else(|e| panic!("{e}"));
    let orchestrator = Orchestrator::new(Some(Arc::new(scenario_authority())), DependencySource::Rest)
        .unwrap_or_else(|e| panic!("{e}"))
        .with_response_customizer(scenario_override());
    Arc::new(
        AlignmentBarrier::new(model, orchestrator, BarrierPolicy::default())
            .unwrap_or_else(|e| panic!("{e}")),
    )
}
