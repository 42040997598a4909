//! errors.rs - Custom error types for the logscrub-core library.
//!
//! This module defines a structured error enum for the library. Note the
//! deliberately small surface: malformed, binary, or hostile *content* is
//! never an error (it becomes a `CorruptionDetection` instead); only caller
//! mistakes such as an invalid configuration fail hard, and only at
//! construction time.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `logscrub-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions. This prevents them from
/// matching all variants exhaustively, thus avoiding breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    #[error("Configuration value `{name}` must be greater than zero")]
    InvalidLimit { name: &'static str },

    #[error("Configuration value `{name}` is out of range: {value}")]
    InvalidTuning { name: &'static str, value: f64 },

    #[error("Failed to compile detection rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}
