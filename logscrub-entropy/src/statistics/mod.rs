// logscrub-entropy/src/statistics/mod.rs
use libm::sqrt;

use crate::entropy::shannon_entropy;
use crate::EntropyScore;

/// Statistics for a set of entropy values.
#[derive(Debug, Clone, Copy)]
pub struct EntropyStats {
    /// The arithmetic mean of the sampled entropy values.
    pub mean: EntropyScore,
    /// The standard deviation, representing the variance in the sample.
    pub std_dev: EntropyScore,
}

/// Calculates mean and standard deviation for a slice of values.
pub fn compute_stats(values: &[f64]) -> EntropyStats {
    if values.is_empty() {
        return EntropyStats { mean: 0.0, std_dev: 0.0 };
    }

    let len = values.len() as f64;
    let mean = values.iter().sum::<f64>() / len;

    let variance = values
        .iter()
        .map(|value| {
            let diff = mean - value;
            diff * diff
        })
        .sum::<f64>()
        / len;

    EntropyStats {
        mean,
        std_dev: sqrt(variance),
    }
}

/// Entropy statistics over fixed-size windows of a byte sequence.
///
/// Compressed streams are uniformly random: every window scores near the
/// ceiling and the deviation between windows stays small. Text with an
/// embedded secret spikes in one window but not the others. The sanitizer
/// uses the window profile to describe *how* random a decoded blob is,
/// not just its aggregate score.
pub fn window_entropy_stats(data: &[u8], window: usize) -> EntropyStats {
    const MAX_WINDOWS: usize = 128;

    if data.is_empty() || window == 0 {
        return EntropyStats { mean: 0.0, std_dev: 0.0 };
    }

    let mut samples = [0.0f64; MAX_WINDOWS];
    let mut count = 0;
    for chunk in data.chunks(window) {
        if count >= MAX_WINDOWS {
            break;
        }
        // Skip trailing fragments too small to score meaningfully.
        if chunk.len() >= window / 2 {
            samples[count] = shannon_entropy(chunk);
            count += 1;
        }
    }

    compute_stats(&samples[..count])
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc;
    use alloc::vec::Vec;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_compute_stats_identical_values() {
        let stats = compute_stats(&[4.0, 4.0, 4.0]);
        assert_eq!(stats.mean, 4.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_compute_stats_simple_range() {
        // Values: 2, 4, 4, 4, 5, 5, 7, 9 -> mean 5.0, variance 4.0, std-dev 2.0
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = compute_stats(&values);

        assert!((stats.mean - 5.0).abs() < EPSILON);
        assert!((stats.std_dev - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_window_stats_uniform_random() {
        // A repeating full-byte-range pattern: every window hits the same
        // entropy, so deviation collapses to zero.
        let data: Vec<u8> = (0..1024u32).map(|i| (i % 256) as u8).collect();
        let stats = window_entropy_stats(&data, 256);
        assert!(stats.mean > 7.9);
        assert!(stats.std_dev < EPSILON);
    }

    #[test]
    fn test_window_stats_degenerate_window() {
        let stats = window_entropy_stats(b"abc", 0);
        assert_eq!(stats.mean, 0.0);
    }
}
