//! Core types for depalign
//!
//! This module holds the error taxonomy shared by every other module of the crate.
//!
//! # Error Management
//!
//! depalign separates errors for code from errors for people:
//! - **Strongly-typed errors** ([`AlignError`]) carry exactly what went wrong and are
//!   matched on by the barrier, the orchestrator and the tests
//! - **User-friendly contexts** ([`ErrorContext`]) add details and suggestions and are what
//!   the CLI prints
//! - [`user_friendly_error`] converts any `anyhow::Error` coming out of a command into an
//!   [`ErrorContext`]
//!
//! # Example
//!
//! ```rust
//! use depalign_cli::core::AlignError;
//!
//! let error = AlignError::MissingAuthority;
//! assert!(error.is_configuration_error());
//! ```

pub mod error;

pub use error::{AlignError, ErrorContext, user_friendly_error};
