//! Integration test suite for depalign
//!
//! End-to-end tests of the alignment pipeline through the library API and through the
//! `depalign` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **scenario**: the three-module build, barrier exactly-once under concurrency
//! - **pipeline**: overrides, exclusions, disabled dependency source, failure atomicity
//! - **config**: building the pipeline from `depalign.toml` and properties
//! - **cli**: the `depalign` binary

mod common;

mod cli;
mod config;
mod pipeline;
mod scenario;
