//! The safety scorer: folds every detection into a single [0, 1] trust
//! metric for downstream consumers.
//!
//! License: MIT OR APACHE 2.0

use crate::config::SeverityWeights;
use crate::detection::CorruptionDetection;

/// Penalty applied when sanitization changed the payload size drastically.
/// Guards against silent catastrophic content loss going unnoticed even
/// when the individual detections look mild.
pub(crate) const SIZE_PENALTY: f64 = 0.2;

/// Relative size change above which the penalty applies.
pub(crate) const SIZE_CHANGE_LIMIT: f64 = 0.5;

/// Computes the safety score:
/// `clamp(1 - Σ(weight(severity) × confidence) - size_penalty, 0, 1)`.
///
/// Zero detections always score 1.0.
pub(crate) fn safety_score(
    detections: &[CorruptionDetection],
    weights: &SeverityWeights,
    original_size: usize,
    sanitized_size: usize,
) -> f64 {
    let detection_cost: f64 = detections
        .iter()
        .map(|d| weights.weight(d.severity) * d.confidence)
        .sum();

    let size_penalty = if original_size > 0 {
        let change = original_size.abs_diff(sanitized_size) as f64 / original_size as f64;
        if change > SIZE_CHANGE_LIMIT {
            SIZE_PENALTY
        } else {
            0.0
        }
    } else {
        0.0
    };

    (1.0 - detection_cost - size_penalty).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{CorruptionType, Severity};

    fn detection(severity: Severity, confidence: f64) -> CorruptionDetection {
        CorruptionDetection {
            corruption_type: CorruptionType::SuspiciousPattern,
            severity,
            location: "line 1".into(),
            description: String::new(),
            sample: String::new(),
            confidence,
        }
    }

    #[test]
    fn clean_result_scores_one() {
        let weights = SeverityWeights::default();
        assert_eq!(safety_score(&[], &weights, 100, 100), 1.0);
    }

    #[test]
    fn detections_reduce_the_score() {
        let weights = SeverityWeights::default();
        let detections = vec![detection(Severity::Medium, 1.0)];
        let score = safety_score(&detections, &weights, 100, 100);
        assert!((score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn one_more_critical_detection_strictly_lowers_the_score() {
        let weights = SeverityWeights::default();
        let mut detections = vec![detection(Severity::Medium, 0.5)];
        let base = safety_score(&detections, &weights, 100, 100);
        detections.push(detection(Severity::Critical, 0.9));
        let worse = safety_score(&detections, &weights, 100, 100);
        assert!(worse < base);
    }

    #[test]
    fn score_never_leaves_unit_interval() {
        let weights = SeverityWeights::default();
        let detections: Vec<_> = (0..10).map(|_| detection(Severity::Critical, 1.0)).collect();
        assert_eq!(safety_score(&detections, &weights, 100, 100), 0.0);
    }

    #[test]
    fn large_size_change_is_penalized() {
        let weights = SeverityWeights::default();
        let detections = vec![detection(Severity::Low, 1.0)];
        let unpenalized = safety_score(&detections, &weights, 100, 80);
        let penalized = safety_score(&detections, &weights, 100, 30);
        assert!((unpenalized - penalized - SIZE_PENALTY).abs() < 1e-9);
    }

    #[test]
    fn growth_counts_as_change_too() {
        let weights = SeverityWeights::default();
        let score = safety_score(&[], &weights, 100, 300);
        assert!((score - (1.0 - SIZE_PENALTY)).abs() < 1e-9);
    }

    #[test]
    fn empty_original_is_not_penalized() {
        let weights = SeverityWeights::default();
        assert_eq!(safety_score(&[], &weights, 0, 0), 1.0);
    }
}
