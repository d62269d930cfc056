//! Configuration for depalign.
//!
//! Two TOML files drive an alignment:
//!
//! 1. **Alignment configuration** (`depalign.toml`) - suffix settings, the dependency source,
//!    override and exclusion rules. See [`AlignmentConfig`].
//! 2. **Build description** - the modules of the build and their dependencies. See
//!    [`BuildDescription`].
//!
//! Both are read with [`parse_config`], which attaches the file path to every read or
//! parse error.
//!
//! # Locating the configuration
//!
//! The configuration path is, in order of precedence:
//!
//! 1. `--config <PATH>` on the command line
//! 2. the `DEPALIGN_CONFIG` environment variable
//! 3. `depalign.toml` in the current directory
//!
//! A missing file at the default location is not an error; the defaults apply.
//!
//! # Property overrides
//!
//! Every setting can also be given as a `-D key=value` property, in the flat form build
//! tools pass them:
//!
//! ```text
//! depalign align --build build.toml \
//!     -D versionIncrementalSuffix=temporary \
//!     -D dependencyOverride.org.hibernate:hibernate-core@*=5.3.7.Final-redhat-00001
//! ```
//!
//! Properties are applied after the file, so they win.

mod build;
mod parser;
mod settings;

pub use build::{BuildDescription, DependencyDescription, ModuleDescription};
pub use parser::{parse_config, parse_config_str};
pub use settings::{
    AlignmentConfig, CONFIG_FILE_NAME, EXCLUSION_PREFIX, OVERRIDE_PREFIX, RuleTable, parse_property,
};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "DEPALIGN_CONFIG";
