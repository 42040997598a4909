//! Self-validation harness: runs the full pipeline against labeled cases
//! and reports whether the sanitizer's behavioral contract still holds.
//!
//! This is a runtime surface, not just test scaffolding: operators feed it
//! curated cases after rule-table or configuration changes to regression-
//! check detection and scoring behavior in place.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};

use crate::detection::CorruptionType;
use crate::sanitizer::LogSanitizer;

/// One labeled test case for the harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCase {
    pub name: String,
    /// Payload fed through the full pipeline.
    pub content: String,
    /// Corruption types that must appear among the detections (a subset
    /// check; extra detections are fine).
    pub expected_types: Vec<CorruptionType>,
    /// Lower bound the actual safety score must meet.
    pub min_safety_score: f64,
}

/// Per-case diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub passed: bool,
    pub expected_types: Vec<CorruptionType>,
    pub detected_types: Vec<CorruptionType>,
    pub expected_min_score: f64,
    pub actual_score: f64,
    /// Human-readable reasons for failure; empty when the case passed.
    pub failures: Vec<String>,
}

/// Aggregate report over a validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub outcomes: Vec<CaseOutcome>,
    pub passed: usize,
    pub failed: usize,
    /// Fraction of cases that passed, in `[0, 1]`.
    pub success_rate: f64,
}

impl ValidationReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

impl LogSanitizer {
    /// Runs every case through the full pipeline and checks (a) that the
    /// expected corruption types are a subset of the detected ones and
    /// (b) that the safety score meets the case's minimum.
    pub fn run_validation(&self, cases: &[ValidationCase]) -> ValidationReport {
        let mut outcomes = Vec::with_capacity(cases.len());
        let mut passed = 0usize;

        for case in cases {
            let result = self.sanitize(&case.content, None);
            let detected = result.detected_types();
            let mut failures = Vec::new();

            for expected in &case.expected_types {
                if !detected.contains(expected) {
                    failures.push(format!(
                        "expected corruption type {expected:?} was not detected"
                    ));
                }
            }
            if result.safety_score < case.min_safety_score {
                failures.push(format!(
                    "safety score {:.3} below expected minimum {:.3}",
                    result.safety_score, case.min_safety_score
                ));
            }

            let case_passed = failures.is_empty();
            if case_passed {
                passed += 1;
            }
            outcomes.push(CaseOutcome {
                name: case.name.clone(),
                passed: case_passed,
                expected_types: case.expected_types.clone(),
                detected_types: detected.into_iter().collect(),
                expected_min_score: case.min_safety_score,
                actual_score: result.safety_score,
                failures,
            });
        }

        let failed = cases.len() - passed;
        let success_rate = if cases.is_empty() {
            1.0
        } else {
            passed as f64 / cases.len() as f64
        };
        ValidationReport {
            outcomes,
            passed,
            failed,
            success_rate,
        }
    }
}
