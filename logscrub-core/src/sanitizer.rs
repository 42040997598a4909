//! The `LogSanitizer` orchestrator: wires the passes together in their
//! fixed order and produces the `SanitizationResult` callers consume.
//!
//! Construction is the only fallible step (configuration validation and
//! rule compilation). Sanitization itself never fails: hostile or mangled
//! content becomes detections and repair actions, not errors.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::config::SanitizerConfig;
use crate::detection::{Findings, SanitizationResult};
use crate::errors::ScrubError;
use crate::ledger::CorruptionLedger;
use crate::passes::{compression, content, encoding, json_repair, line as line_pass};
use crate::rules::{self, CompiledRuleset};
use crate::scoring;

/// The top-level sanitization pipeline.
///
/// Cheap to construct per configuration; safe to share across threads and
/// to call concurrently for independent payloads. The rule tables are
/// read-only, and the ledger handles its own locking.
#[derive(Debug)]
pub struct LogSanitizer {
    config: SanitizerConfig,
    ruleset: Arc<CompiledRuleset>,
    ledger: Arc<CorruptionLedger>,
}

impl LogSanitizer {
    /// Builds a sanitizer, validating `config` and compiling the rule
    /// tables. Invalid configuration is a caller error and fails here,
    /// never later.
    pub fn new(config: SanitizerConfig, ledger: Arc<CorruptionLedger>) -> Result<Self, ScrubError> {
        config.validate()?;
        let ruleset = rules::shared_ruleset()?;
        debug!(
            "LogSanitizer ready (ruleset {}, {} rules)",
            ruleset.version,
            ruleset.rule_names().len()
        );
        Ok(Self {
            config,
            ruleset,
            ledger,
        })
    }

    /// Builds a sanitizer with the default configuration.
    pub fn with_defaults(ledger: Arc<CorruptionLedger>) -> Result<Self, ScrubError> {
        Self::new(SanitizerConfig::default(), ledger)
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    pub fn ruleset(&self) -> &CompiledRuleset {
        &self.ruleset
    }

    pub fn ledger(&self) -> &Arc<CorruptionLedger> {
        &self.ledger
    }

    /// Sanitizes a raw byte payload, running encoding normalization first.
    ///
    /// `source` is free-form metadata recorded with the ledger summary;
    /// it never influences processing.
    pub fn sanitize_bytes(
        &self,
        input: &[u8],
        source: Option<&HashMap<String, String>>,
    ) -> SanitizationResult {
        let started = Instant::now();
        let mut findings = Findings::default();
        let text = encoding::normalize_input(input, &mut findings);
        self.run_pipeline(input.len(), input, text, findings, source, started)
    }

    /// Sanitizes already-decoded text, skipping the encoding stage.
    pub fn sanitize(
        &self,
        input: &str,
        source: Option<&HashMap<String, String>>,
    ) -> SanitizationResult {
        let started = Instant::now();
        let findings = Findings::default();
        self.run_pipeline(
            input.len(),
            input.as_bytes(),
            input.to_string(),
            findings,
            source,
            started,
        )
    }

    fn run_pipeline(
        &self,
        original_size: usize,
        raw_input: &[u8],
        text: String,
        mut findings: Findings,
        source: Option<&HashMap<String, String>>,
        started: Instant,
    ) -> SanitizationResult {
        // Whole-content passes. Order matters: every later pass assumes
        // bounded, null-free, text-shaped input.
        let text = content::enforce_size_limit(text, self.config.max_log_size, &mut findings);
        let text = content::null_byte_pass(text, &mut findings);
        let text = content::binary_pass(text, raw_input, &mut findings);
        let text = content::control_char_pass(text, &mut findings);

        // Per-line pipeline. Terminators are carried alongside each line so
        // reassembly reproduces the original newline structure (trailing
        // newline, CRLF endings) byte for byte.
        let mut sanitized_content = String::with_capacity(text.len());
        let mut quarantined: Vec<String> = Vec::new();
        let mut rest = text.as_str();
        let mut line_no = 0usize;

        while !rest.is_empty() {
            let (raw_line, terminator, remainder) = split_first_line(rest);
            rest = remainder;
            line_no += 1;

            if raw_line.trim().is_empty() {
                sanitized_content.push_str(raw_line);
                sanitized_content.push_str(terminator);
                continue;
            }

            let line = line_pass::enforce_line_length(
                raw_line.to_string(),
                self.config.max_line_length,
                line_no,
                &mut findings,
            );

            if line_pass::quarantine_if_injection(
                &self.ruleset,
                &line,
                line_no,
                &mut quarantined,
                &mut findings,
            ) {
                continue;
            }

            let line = line_pass::suspicious_pass(
                &self.ruleset,
                line,
                line_no,
                self.config.suspicious_pattern_threshold,
                self.config.suspicious_match_weight,
                &mut findings,
            );

            let line = match json_repair::repair_line(
                &line,
                self.config.max_json_depth,
                line_no,
                &mut findings,
            ) {
                Some(repaired) => repaired,
                None => line,
            };

            let line = match compression::scan_line(
                &line,
                self.config.max_log_size,
                line_no,
                &mut findings,
            ) {
                Some(expanded) => expanded,
                None => line,
            };

            sanitized_content.push_str(&line);
            sanitized_content.push_str(terminator);
        }

        let safety_score = scoring::safety_score(
            &findings.detections,
            &self.config.severity_weights,
            original_size,
            sanitized_content.len(),
        );

        let result = SanitizationResult {
            original_size,
            sanitized_size: sanitized_content.len(),
            corruptions_detected: findings.detections,
            actions_taken: findings.actions,
            sanitized_content,
            quarantined_content: quarantined,
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            safety_score,
        };

        let empty_source = HashMap::new();
        self.ledger.record(&result, source.unwrap_or(&empty_source));
        debug!(
            "Sanitized {} bytes -> {} bytes: {} detections, score {:.2}",
            result.original_size,
            result.sanitized_size,
            result.corruptions_detected.len(),
            result.safety_score
        );
        result
    }
}

/// Splits off the first line of `text`, returning the line content, its
/// terminator (`"\n"`, `"\r\n"`, or `""` at end of input), and the rest.
fn split_first_line(text: &str) -> (&str, &str, &str) {
    match text.find('\n') {
        Some(i) => {
            let (with_term, rest) = text.split_at(i + 1);
            let term_len = if i > 0 && with_term.as_bytes()[i - 1] == b'\r' { 2 } else { 1 };
            let (line, terminator) = with_term.split_at(with_term.len() - term_len);
            (line, terminator, rest)
        }
        None => (text, "", ""),
    }
}
