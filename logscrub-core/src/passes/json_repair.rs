//! JSON-aware line repair: depth bounding, bounded textual auto-repair,
//! and an escape-as-string fallback that is always syntactically safe.
//!
//! The repair cascade is expressed as explicit outcome enums rather than
//! catch-and-continue control flow, so every branch of the decision tree
//! is visible and testable on its own.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::detection::{CorruptionType, Findings, SanitizationAction, Severity};

/// serde_json refuses to recurse deeper than this; structures past it can
/// only be escaped, never flattened.
const PARSE_DEPTH_CEILING: usize = 128;

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",\s*([}\]])").unwrap()
});
static BARE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").unwrap()
});

/// How a JSON-looking line left the repair stage.
#[derive(Debug, PartialEq)]
enum RepairOutcome {
    /// Parsed cleanly within the depth limit; nothing to do.
    Clean,
    /// Nesting exceeded the limit; deep nodes were stringified.
    Flattened(String),
    /// Textual auto-repair produced parseable JSON.
    Repaired(String),
    /// Unsalvageable; the whole line re-encoded as a JSON string literal.
    Escaped(String),
}

/// What went wrong on the first strict parse.
#[derive(Debug)]
enum ParseFailure {
    /// Structure ends mid-value, typical of a truncated log entry.
    Truncated(String),
    /// Any other syntax defect.
    Syntax(String),
}

/// Runs the repair stage on a line that starts with `{` or `[`. Returns the
/// replacement text, or `None` when the line is not JSON-shaped or needed
/// no changes.
pub(crate) fn repair_line(
    line: &str,
    max_depth: usize,
    line_no: usize,
    findings: &mut Findings,
) -> Option<String> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return None;
    }

    let depth = structural_depth(line);
    let outcome = if depth > max_depth {
        findings.detect(
            CorruptionType::MalformedJson,
            Severity::Medium,
            format!("line {line_no}"),
            format!("JSON nesting depth {depth} exceeds limit {max_depth}"),
            line,
            0.8,
        );
        flatten_deep_line(line, max_depth)
    } else {
        match strict_parse(line) {
            Ok(()) => RepairOutcome::Clean,
            Err(failure) => {
                let (corruption_type, severity, confidence, reason) = match &failure {
                    ParseFailure::Truncated(e) => {
                        (CorruptionType::TruncatedLog, Severity::Medium, 0.7, e.clone())
                    }
                    ParseFailure::Syntax(e) => {
                        (CorruptionType::MalformedJson, Severity::High, 0.9, e.clone())
                    }
                };
                findings.detect(
                    corruption_type,
                    severity,
                    format!("line {line_no}"),
                    format!("JSON parse failed: {reason}"),
                    line,
                    confidence,
                );
                attempt_auto_repair(line)
            }
        }
    };

    match outcome {
        RepairOutcome::Clean => None,
        RepairOutcome::Flattened(text) => {
            findings.act(
                SanitizationAction::Sanitized,
                format!("flattened over-deep JSON on line {line_no}"),
            );
            Some(text)
        }
        RepairOutcome::Repaired(text) => {
            debug!("Auto-repaired JSON on line {line_no}");
            findings.act(
                SanitizationAction::Sanitized,
                format!("auto-repaired JSON syntax on line {line_no}"),
            );
            Some(text)
        }
        RepairOutcome::Escaped(text) => {
            findings.act(
                SanitizationAction::Escaped,
                format!("re-encoded unrepairable line {line_no} as a JSON string"),
            );
            Some(text)
        }
    }
}

fn strict_parse(line: &str) -> Result<(), ParseFailure> {
    match serde_json::from_str::<Value>(line) {
        Ok(_) => Ok(()),
        Err(e) if e.is_eof() => Err(ParseFailure::Truncated(e.to_string())),
        Err(e) => Err(ParseFailure::Syntax(e.to_string())),
    }
}

/// Depth-bounds a line whose textual nesting exceeds the limit. Parseable
/// structures get their deep nodes stringified and are re-serialized
/// canonically; structures too deep to parse at all are escaped whole.
fn flatten_deep_line(line: &str, max_depth: usize) -> RepairOutcome {
    if structural_depth(line) > PARSE_DEPTH_CEILING {
        return RepairOutcome::Escaped(escape_as_string(line));
    }
    match serde_json::from_str::<Value>(line) {
        Ok(value) => {
            let flattened = flatten_below(value, max_depth);
            match serde_json::to_string(&flattened) {
                Ok(text) => RepairOutcome::Flattened(text),
                Err(_) => RepairOutcome::Escaped(escape_as_string(line)),
            }
        }
        Err(_) => RepairOutcome::Escaped(escape_as_string(line)),
    }
}

fn attempt_auto_repair(line: &str) -> RepairOutcome {
    let repaired = normalize_quotes(line);
    let repaired = BARE_KEY.replace_all(&repaired, "$1\"$2\":").into_owned();
    let repaired = TRAILING_COMMA.replace_all(&repaired, "$1").into_owned();

    if serde_json::from_str::<Value>(&repaired).is_ok() {
        RepairOutcome::Repaired(repaired)
    } else {
        RepairOutcome::Escaped(escape_as_string(line))
    }
}

/// Re-encodes the entire line as a single JSON string literal so it is
/// syntactically safe to embed downstream.
fn escape_as_string(line: &str) -> String {
    Value::String(line.to_string()).to_string()
}

/// Maximum bracket nesting depth, computed textually so arbitrarily deep
/// input never causes recursion. String contents and escapes are honored.
fn structural_depth(line: &str) -> usize {
    let mut depth = 0usize;
    let mut max_depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in line.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max_depth
}

/// Stringifies every container nested deeper than `budget` levels, leaving
/// everything above untouched.
fn flatten_below(value: Value, budget: usize) -> Value {
    if budget == 0 {
        return match value {
            v @ (Value::Object(_) | Value::Array(_)) => Value::String(v.to_string()),
            scalar => scalar,
        };
    }
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, flatten_below(v, budget - 1)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items.into_iter().map(|v| flatten_below(v, budget - 1)).collect(),
        ),
        scalar => scalar,
    }
}

/// Converts single-quoted keys/strings to double-quoted ones, escaping any
/// embedded double quotes. Double-quoted regions pass through unchanged.
fn normalize_quotes(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;

    for c in line.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                escaped = true;
            }
            '"' if in_single => out.push_str("\\\""),
            '"' if !in_single => {
                in_double = !in_double;
                out.push(c);
            }
            '\'' if !in_double => {
                in_single = !in_single;
                out.push('"');
            }
            _ => out.push(c),
        }
    }
    out
}
