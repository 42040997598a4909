//! The corruption statistics and history ledger.
//!
//! One `CorruptionLedger` lives for the whole process and is shared by
//! reference with every sanitizer instance; tests construct their own
//! isolated ledgers. All mutation happens behind a single mutex so counter
//! updates and history ordering stay consistent under concurrent writers.
//!
//! License: MIT OR APACHE 2.0

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::detection::{CorruptionType, SanitizationResult};

/// Ring-buffer capacity for result summaries.
pub const HISTORY_CAPACITY: usize = 1000;

/// How many recent entries feed the rolling averages.
pub const RECENT_WINDOW: usize = 100;

/// A lightweight summary of one sanitization run.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySummary {
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied source metadata, audit-only.
    pub source: HashMap<String, String>,
    pub original_size: usize,
    pub sanitized_size: usize,
    pub detection_count: usize,
    pub safety_score: f64,
}

/// Snapshot returned by [`CorruptionLedger::statistics`].
#[derive(Debug, Clone, Serialize)]
pub struct CorruptionStatistics {
    /// Running count per corruption category, one increment per detection
    /// instance.
    pub counts: BTreeMap<CorruptionType, u64>,
    /// Number of summaries currently held in the history ring.
    pub history_len: usize,
    /// Mean safety score over the most recent [`RECENT_WINDOW`] entries.
    pub recent_average_safety_score: f64,
    /// Mean fractional size reduction over the same window. Negative means
    /// outputs grew (escaping can add characters).
    pub recent_average_size_reduction: f64,
}

#[derive(Debug, Default)]
struct LedgerInner {
    counts: BTreeMap<CorruptionType, u64>,
    history: VecDeque<HistorySummary>,
}

/// Process-wide, mutex-guarded corruption ledger.
#[derive(Debug, Default)]
pub struct CorruptionLedger {
    inner: Mutex<LedgerInner>,
}

impl CorruptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a finished result into the counters and history ring. Called
    /// once per sanitize call, after the result is finalized.
    pub fn record(&self, result: &SanitizationResult, source: &HashMap<String, String>) {
        let mut inner = self.inner.lock().unwrap();

        for detection in &result.corruptions_detected {
            *inner.counts.entry(detection.corruption_type).or_insert(0) += 1;
        }

        if inner.history.len() == HISTORY_CAPACITY {
            inner.history.pop_front();
        }
        inner.history.push_back(HistorySummary {
            timestamp: Utc::now(),
            source: source.clone(),
            original_size: result.original_size,
            sanitized_size: result.sanitized_size,
            detection_count: result.corruptions_detected.len(),
            safety_score: result.safety_score,
        });
    }

    /// A point-in-time snapshot: full counter map plus rolling averages
    /// over the most recent [`RECENT_WINDOW`] history entries.
    pub fn statistics(&self) -> CorruptionStatistics {
        let inner = self.inner.lock().unwrap();

        let recent: Vec<&HistorySummary> = inner
            .history
            .iter()
            .rev()
            .take(RECENT_WINDOW)
            .collect();

        let (avg_score, avg_reduction) = if recent.is_empty() {
            (0.0, 0.0)
        } else {
            let n = recent.len() as f64;
            let score_sum: f64 = recent.iter().map(|h| h.safety_score).sum();
            let reduction_sum: f64 = recent
                .iter()
                .map(|h| {
                    if h.original_size == 0 {
                        0.0
                    } else {
                        (h.original_size as f64 - h.sanitized_size as f64)
                            / h.original_size as f64
                    }
                })
                .sum();
            (score_sum / n, reduction_sum / n)
        };

        CorruptionStatistics {
            counts: inner.counts.clone(),
            history_len: inner.history.len(),
            recent_average_safety_score: avg_score,
            recent_average_size_reduction: avg_reduction,
        }
    }
}
