//! Configuration for the `logscrub-core` sanitization pipeline.
//!
//! Defines `SanitizerConfig`, the full set of limits and tunables the
//! pipeline honors, with the defaults the rest of the documentation assumes.
//! Invalid values are rejected up front by [`SanitizerConfig::validate`];
//! this is the only hard-failure path in the library.
//!
//! License: MIT OR Apache-2.0

use log::debug;
use serde::{Deserialize, Serialize};

use crate::detection::Severity;
use crate::errors::ScrubError;

/// Default hard ceiling for a whole payload: 100 MiB.
pub const DEFAULT_MAX_LOG_SIZE: usize = 100 * 1024 * 1024;

/// Default hard ceiling for a single line: 64 KiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Default maximum JSON nesting depth before flattening kicks in.
pub const DEFAULT_MAX_JSON_DEPTH: usize = 20;

/// Per-severity weights used by the safety scorer.
///
/// These are empirically chosen, not derived; they are configuration rather
/// than constants so deployments can tune them. Higher simply means a
/// detection of that severity costs more trust.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            low: 0.05,
            medium: 0.15,
            high: 0.3,
            critical: 0.5,
        }
    }
}

impl SeverityWeights {
    /// The scoring weight for a given severity.
    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    fn validate(&self) -> Result<(), ScrubError> {
        for (name, value) in [
            ("severity_weights.low", self.low),
            ("severity_weights.medium", self.medium),
            ("severity_weights.high", self.high),
            ("severity_weights.critical", self.critical),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ScrubError::InvalidTuning { name, value });
            }
        }
        Ok(())
    }
}

/// Limits and tunables for a [`LogSanitizer`](crate::LogSanitizer).
///
/// All fields have serde defaults, so callers deserializing a partial
/// configuration get the documented defaults for anything omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Hard ceiling for payload size in bytes. Content beyond it is truncated.
    pub max_log_size: usize,
    /// Hard ceiling for a single line in bytes. Longer lines are truncated.
    pub max_line_length: usize,
    /// Maximum JSON nesting depth; deeper structures are flattened.
    pub max_json_depth: usize,
    /// Accumulated suspicion score above which a line gets escaped.
    pub suspicious_pattern_threshold: f64,
    /// Score contributed by each suspicious-pattern match on a line.
    pub suspicious_match_weight: f64,
    /// Safety-scorer weights per detection severity.
    pub severity_weights: SeverityWeights,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_log_size: DEFAULT_MAX_LOG_SIZE,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_json_depth: DEFAULT_MAX_JSON_DEPTH,
            suspicious_pattern_threshold: 0.7,
            suspicious_match_weight: 0.1,
            severity_weights: SeverityWeights::default(),
        }
    }
}

impl SanitizerConfig {
    /// Checks every field for sanity. Called by the sanitizer constructor;
    /// a failure here is a caller error, never a content error.
    pub fn validate(&self) -> Result<(), ScrubError> {
        if self.max_log_size == 0 {
            return Err(ScrubError::InvalidLimit { name: "max_log_size" });
        }
        if self.max_line_length == 0 {
            return Err(ScrubError::InvalidLimit { name: "max_line_length" });
        }
        if self.max_json_depth == 0 {
            return Err(ScrubError::InvalidLimit { name: "max_json_depth" });
        }
        if !self.suspicious_pattern_threshold.is_finite() || self.suspicious_pattern_threshold <= 0.0 {
            return Err(ScrubError::InvalidTuning {
                name: "suspicious_pattern_threshold",
                value: self.suspicious_pattern_threshold,
            });
        }
        if !self.suspicious_match_weight.is_finite()
            || self.suspicious_match_weight <= 0.0
            || self.suspicious_match_weight > 1.0
        {
            return Err(ScrubError::InvalidTuning {
                name: "suspicious_match_weight",
                value: self.suspicious_match_weight,
            });
        }
        self.severity_weights.validate()?;

        debug!(
            "Sanitizer config validated: max_log_size={} max_line_length={} max_json_depth={}",
            self.max_log_size, self.max_line_length, self.max_json_depth
        );
        Ok(())
    }
}
