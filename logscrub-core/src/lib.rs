// logscrub-core/src/lib.rs
//! # LogScrub Core Library
//!
//! `logscrub-core` ingests arbitrary, potentially adversarial or corrupted
//! log payloads and neutralizes structural, encoding, and injection-based
//! threats before the content reaches downstream parsers, LLM prompts, or
//! storage. It never fails on bad content: every problem becomes a
//! `CorruptionDetection` plus a best-effort recovery action, and callers
//! always get back a complete [`SanitizationResult`].
//!
//! ## Modules
//!
//! * `config`: Defines `SanitizerConfig`, the limits and tunables the pipeline honors.
//! * `detection`: The corruption taxonomy, detections, actions, and the result type.
//! * `rules`: The versioned injection/suspicious pattern tables and their compiled form.
//! * `passes`: The ordered defensive passes (encoding, content, line, JSON repair, compression).
//! * `scoring`: The safety scorer folding detections into a single trust metric.
//! * `ledger`: The process-wide corruption statistics and history ledger.
//! * `sanitizer`: The `LogSanitizer` orchestrator.
//! * `harness`: The self-validation harness for regression-checking pipeline behavior.
//!
//! ## Pipeline
//!
//! Encoding normalization, then the whole-content passes (size ceiling,
//! null bytes, binary detection, control characters), then per line:
//! length guard, injection quarantine, suspicious-pattern escaping,
//! JSON-aware repair, compressed-blob decoding. Retained lines are
//! reassembled in order, scored, and the run is recorded in the ledger.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use logscrub_core::{CorruptionLedger, LogSanitizer, SanitizerConfig};
//!
//! # fn main() -> Result<(), logscrub_core::ScrubError> {
//! // One ledger per process, shared by every sanitizer instance.
//! let ledger = Arc::new(CorruptionLedger::new());
//! let sanitizer = LogSanitizer::new(SanitizerConfig::default(), ledger)?;
//!
//! let result = sanitizer.sanitize("{\"level\":\"INFO\",\"msg\":\"ok\"}", None);
//! assert_eq!(result.safety_score, 1.0);
//! println!("{}", result.sanitized_content);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! A `LogSanitizer` is `Send + Sync`: the rule tables and configuration
//! are read-only after construction, and the ledger guards its own state
//! with a mutex. Concurrent `sanitize` calls for independent payloads need
//! no external synchronization.
//!
//! ## Error Handling
//!
//! The only fallible operation is constructing a sanitizer with invalid
//! configuration ([`ScrubError`]). Content is never an error.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod detection;
pub mod errors;
pub mod harness;
pub mod ledger;
pub mod passes;
pub mod rules;
pub mod sanitizer;

mod scoring;

pub use config::{
    SanitizerConfig, SeverityWeights, DEFAULT_MAX_JSON_DEPTH, DEFAULT_MAX_LINE_LENGTH,
    DEFAULT_MAX_LOG_SIZE,
};
pub use detection::{
    ActionRecord, CorruptionDetection, CorruptionType, SanitizationAction, SanitizationResult,
    Severity,
};
pub use errors::ScrubError;
pub use harness::{CaseOutcome, ValidationCase, ValidationReport};
pub use ledger::{CorruptionLedger, CorruptionStatistics, HistorySummary, HISTORY_CAPACITY};
pub use rules::{CompiledRuleset, InjectionClass, SuspiciousClass, RULESET_VERSION};
pub use sanitizer::LogSanitizer;
