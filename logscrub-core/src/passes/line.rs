//! Per-line passes: length guard, injection containment, and
//! suspicious-pattern escaping.
//!
//! Injection handling is the one place in the pipeline that drops content
//! outright: a matching line is removed from the output stream and stored
//! in quarantine for security review. Everything else is repaired in place.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};

use crate::detection::{CorruptionType, Findings, SanitizationAction, Severity};
use crate::rules::CompiledRuleset;

/// Truncates a line exceeding `max_length` bytes, on a char boundary.
pub(crate) fn enforce_line_length(
    line: String,
    max_length: usize,
    line_no: usize,
    findings: &mut Findings,
) -> String {
    if line.len() <= max_length {
        return line;
    }

    let mut cut = max_length;
    while cut > 0 && !line.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = line[..cut].to_string();
    findings.detect(
        CorruptionType::OversizedEntry,
        Severity::Medium,
        format!("line {line_no}"),
        format!("Line length {} exceeds limit {max_length}", line.len()),
        &truncated,
        1.0,
    );
    findings.act(
        SanitizationAction::Truncated,
        format!("truncated line {line_no} from {} to {cut} bytes", line.len()),
    );
    truncated
}

/// Checks `line` against the injection table. On a match the line is
/// recorded as quarantined and the caller must drop it from the output;
/// returns `true` in that case.
pub(crate) fn quarantine_if_injection(
    ruleset: &CompiledRuleset,
    line: &str,
    line_no: usize,
    quarantine: &mut Vec<String>,
    findings: &mut Findings,
) -> bool {
    let Some(rule) = ruleset.match_injection(line) else {
        return false;
    };

    warn!(
        "Quarantined line {line_no}: injection rule '{}' ({:?}) matched",
        rule.name, rule.class
    );
    findings.detect(
        CorruptionType::InjectionAttempt,
        Severity::Critical,
        format!("line {line_no}"),
        format!("Injection pattern '{}' ({:?}) matched", rule.name, rule.class),
        line,
        0.9,
    );
    findings.act(
        SanitizationAction::Quarantined,
        format!("quarantined line {line_no} (rule '{}')", rule.name),
    );
    quarantine.push(line.to_string());
    true
}

/// Scores `line` against the suspicious table and escapes it when the
/// accumulated score crosses the threshold. Returns the (possibly escaped)
/// line text.
pub(crate) fn suspicious_pass(
    ruleset: &CompiledRuleset,
    line: String,
    line_no: usize,
    threshold: f64,
    match_weight: f64,
    findings: &mut Findings,
) -> String {
    let mut score = 0.0;
    let mut matched_rules: Vec<&'static str> = Vec::new();

    for rule in &ruleset.suspicious {
        let hits = rule.regex.find_iter(&line).count();
        if hits > 0 {
            score += match_weight * hits as f64;
            matched_rules.push(rule.name);
        }
    }

    if score <= threshold {
        return line;
    }

    debug!("Line {line_no} suspicion score {score:.2} exceeds {threshold}; escaping");
    findings.detect(
        CorruptionType::SuspiciousPattern,
        Severity::Medium,
        format!("line {line_no}"),
        format!(
            "Suspicion score {score:.2} from rules [{}]",
            matched_rules.join(", ")
        ),
        &line,
        score.min(1.0),
    );
    let escaped = escape_line(ruleset, &line);
    findings.act(
        SanitizationAction::Escaped,
        format!("escaped suspicious content on line {line_no}"),
    );
    escaped
}

/// Neutralizes without destroying: HTML-escapes angle brackets, defuses
/// `javascript:` prefixes, and tags SQL keyword sequences so the original
/// text stays inspectable.
fn escape_line(ruleset: &CompiledRuleset, line: &str) -> String {
    let escaped = line.replace('<', "&lt;").replace('>', "&gt;");
    let escaped = escaped
        .replace("javascript:", "javascript&#58;")
        .replace("JAVASCRIPT:", "JAVASCRIPT&#58;");
    ruleset
        .sql_keywords
        .replace_all(&escaped, "[sql]$0")
        .into_owned()
}
