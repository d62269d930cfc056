//! Utility functions shared across depalign.
//!
//! - [`fs`] - atomic file writes and directory helpers

pub mod fs;

pub use fs::{atomic_write, ensure_dir, read_text_file};
