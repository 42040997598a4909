//! Provides the core data structures for reporting corruption findings:
//! the corruption taxonomy, individual detections, the actions the pipeline
//! took, and the `SanitizationResult` handed back to callers.
//!
//! Every type here is immutable once built and serializable to JSON so
//! callers can ship results straight into audit trails.
//!
//! License: MIT OR APACHE 2.0

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Number of characters retained in a detection sample.
pub const SAMPLE_CHARS: usize = 100;

/// The closed set of corruption categories the pipeline can report.
///
/// New categories require a code change; nothing is inferred at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorruptionType {
    BinaryData,
    MalformedJson,
    EncodingError,
    InjectionAttempt,
    TruncatedLog,
    CompressedData,
    OversizedEntry,
    SuspiciousPattern,
    ControlCharacters,
    NullBytes,
}

/// Severity of a detection, ordered from least to most serious so that
/// callers can compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A single detected issue. Created once per finding and never mutated;
/// owned by the `SanitizationResult` that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorruptionDetection {
    #[serde(rename = "type")]
    pub corruption_type: CorruptionType,
    pub severity: Severity,
    /// Human-readable position: `"line 12"`, `"byte offsets [0, 4]"`, or
    /// `"entire_content"`.
    pub location: String,
    pub description: String,
    /// First ~100 characters of the offending data, truncated for safety.
    pub sample: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
}

/// The closed set of transformations the pipeline can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitizationAction {
    Removed,
    Sanitized,
    Quarantined,
    Truncated,
    Decoded,
    Decompressed,
    Escaped,
}

/// One applied transformation, recorded in execution order. The full list
/// on a result forms the audit trail of what was done to the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: SanitizationAction,
    pub description: String,
}

/// The only object returned to callers: everything the pipeline found,
/// everything it did, and the content it is willing to pass downstream.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizationResult {
    pub original_size: usize,
    pub sanitized_size: usize,
    pub corruptions_detected: Vec<CorruptionDetection>,
    pub actions_taken: Vec<ActionRecord>,
    pub sanitized_content: String,
    /// Raw lines removed as suspected injection attempts, retained verbatim
    /// for security review. Never merged back into `sanitized_content`.
    pub quarantined_content: Vec<String>,
    pub processing_time_ms: f64,
    /// Aggregate trust metric in `[0, 1]`; 1.0 means nothing was detected.
    pub safety_score: f64,
}

impl SanitizationResult {
    /// The distinct corruption categories present in this result.
    pub fn detected_types(&self) -> BTreeSet<CorruptionType> {
        self.corruptions_detected
            .iter()
            .map(|d| d.corruption_type)
            .collect()
    }

    /// True when nothing at all was flagged.
    pub fn is_clean(&self) -> bool {
        self.corruptions_detected.is_empty()
    }
}

/// Working accumulator threaded through the passes while a result is being
/// assembled. Internal only; it becomes immutable once folded into the
/// `SanitizationResult`.
#[derive(Debug, Default)]
pub(crate) struct Findings {
    pub detections: Vec<CorruptionDetection>,
    pub actions: Vec<ActionRecord>,
}

impl Findings {
    pub(crate) fn detect(
        &mut self,
        corruption_type: CorruptionType,
        severity: Severity,
        location: impl Into<String>,
        description: impl Into<String>,
        sample: &str,
        confidence: f64,
    ) {
        self.detections.push(CorruptionDetection {
            corruption_type,
            severity,
            location: location.into(),
            description: description.into(),
            sample: sample_of(sample),
            confidence: confidence.clamp(0.0, 1.0),
        });
    }

    pub(crate) fn act(&mut self, action: SanitizationAction, description: impl Into<String>) {
        self.actions.push(ActionRecord {
            action,
            description: description.into(),
        });
    }
}

/// Truncates a sample to [`SAMPLE_CHARS`] characters on a char boundary.
pub(crate) fn sample_of(s: &str) -> String {
    s.chars().take(SAMPLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corruption_type_serializes_kebab_case() {
        let json = serde_json::to_string(&CorruptionType::MalformedJson).unwrap();
        assert_eq!(json, "\"malformed-json\"");
        let json = serde_json::to_string(&CorruptionType::NullBytes).unwrap();
        assert_eq!(json, "\"null-bytes\"");
    }

    #[test]
    fn severity_ordering_supports_threshold_checks() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High >= Severity::High);
        assert!(Severity::Low < Severity::Medium);
    }

    #[test]
    fn sample_is_truncated_to_limit() {
        let long = "x".repeat(500);
        assert_eq!(sample_of(&long).chars().count(), SAMPLE_CHARS);
    }

    #[test]
    fn sample_respects_char_boundaries() {
        let s = "é".repeat(150);
        let sample = sample_of(&s);
        assert_eq!(sample.chars().count(), SAMPLE_CHARS);
    }

    #[test]
    fn findings_clamp_confidence() {
        let mut f = Findings::default();
        f.detect(
            CorruptionType::BinaryData,
            Severity::High,
            "entire_content",
            "test",
            "sample",
            3.0,
        );
        assert_eq!(f.detections[0].confidence, 1.0);
    }

    #[test]
    fn detection_serializes_type_field_name() {
        let d = CorruptionDetection {
            corruption_type: CorruptionType::InjectionAttempt,
            severity: Severity::Critical,
            location: "line 1".into(),
            description: "test".into(),
            sample: String::new(),
            confidence: 0.9,
        };
        let v: serde_json::Value = serde_json::to_value(&d).unwrap();
        assert_eq!(v["type"], "injection-attempt");
        assert_eq!(v["severity"], "critical");
    }
}
