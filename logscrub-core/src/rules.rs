//! rules.rs - The versioned detection rule tables and their compiled form.
//!
//! Two independent rule sets drive the per-line passes: injection-attempt
//! patterns (security-critical, matching lines are quarantined) and
//! suspicious-but-benign patterns (encoded payloads, long blobs, which only
//! accumulate a suspicion score). Both are explicit data tables compiled
//! once per process so the active rule set stays auditable and testable on
//! its own.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use log::debug;
use once_cell::sync::OnceCell;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::errors::ScrubError;

/// Version tag of the built-in rule tables. Bump on any table change.
pub const RULESET_VERSION: &str = "2025.08";

/// Size limit for compiled regexes, bounding pathological expansions.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Classes of injection payloads the containment pass recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionClass {
    Sql,
    Xss,
    Shell,
    PathTraversal,
    Ldap,
}

/// Classes of patterns that raise suspicion without warranting removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspiciousClass {
    PercentEncoding,
    Base64Run,
    HexEscape,
    UnicodeEscape,
}

/// One row of a rule table.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec<C: 'static> {
    pub name: &'static str,
    pub class: C,
    pub pattern: &'static str,
}

const fn rule<C>(name: &'static str, class: C, pattern: &'static str) -> RuleSpec<C> {
    RuleSpec { name, class, pattern }
}

use InjectionClass::{Ldap, PathTraversal, Shell, Sql, Xss};
use SuspiciousClass::{Base64Run, HexEscape, PercentEncoding, UnicodeEscape};

/// Injection-attempt patterns, in evaluation order. Any match drops the
/// line into quarantine, so these stay conservative: keyword *sequences*
/// and unambiguous markers, not single tokens.
pub const INJECTION_RULES: &[RuleSpec<InjectionClass>] = &[
    rule("sql_union_select", Sql, r"(?i)\bunion\s+(all\s+)?select\b"),
    rule("sql_destructive_statement", Sql, r"(?i);\s*(drop|delete|truncate|alter)\s"),
    rule("sql_drop_table", Sql, r"(?i)\bdrop\s+table\b"),
    rule("sql_quoted_boolean", Sql, r"(?i)'\s*(or|and)\s*'?\d"),
    rule("xss_script_tag", Xss, r"(?i)<script[^>]*>"),
    rule("xss_javascript_uri", Xss, r"(?i)javascript:"),
    rule("xss_event_handler", Xss, r"(?i)<[^>]+\bon\w+\s*="),
    rule("shell_chained_command", Shell, r";\s*(rm|cat|wget|curl|chmod|nc)\s"),
    rule("shell_piped_interpreter", Shell, r"\|\s*(bash|sh|zsh|cmd)\b"),
    rule("shell_command_substitution", Shell, r"`[^`]+`|\$\([^)]+\)"),
    rule("path_traversal_dotdot", PathTraversal, r"\.\.[\\/]"),
    rule("path_traversal_sensitive_file", PathTraversal, r"[\\/]etc[\\/](passwd|shadow)"),
    rule("ldap_filter_chain", Ldap, r"\(\s*[&|!]\s*\(|\*\s*\)\s*\("),
];

/// Suspicious patterns. Each match adds the configured weight to a per-line
/// score; the line is escaped (never dropped) once the score crosses the
/// threshold.
pub const SUSPICIOUS_RULES: &[RuleSpec<SuspiciousClass>] = &[
    rule("percent_encoded_run", PercentEncoding, r"(?:%[0-9A-Fa-f]{2}){2,}"),
    rule("base64_run", Base64Run, r"[A-Za-z0-9+/]{50,}={0,2}"),
    rule("hex_escape_run", HexEscape, r"(?:\\x[0-9A-Fa-f]{2}){2,}"),
    rule("unicode_escape_run", UnicodeEscape, r"(?:\\u[0-9A-Fa-f]{4}){2,}"),
];

/// SQL keywords tagged (not removed) by the escape action so downstream
/// consumers cannot execute them by accident.
const SQL_KEYWORD_PATTERN: &str =
    r"(?i)\b(union\s+select|drop\s+table|insert\s+into|delete\s+from|exec(?:ute)?\s)";

/// A compiled rule, ready for matching.
#[derive(Debug)]
pub struct CompiledRule<C: 'static> {
    pub name: &'static str,
    pub class: C,
    pub regex: Regex,
}

/// The full compiled rule set shared (read-only) by every sanitizer in the
/// process.
#[derive(Debug)]
pub struct CompiledRuleset {
    pub version: &'static str,
    pub injection: Vec<CompiledRule<InjectionClass>>,
    pub suspicious: Vec<CompiledRule<SuspiciousClass>>,
    pub(crate) sql_keywords: Regex,
}

impl CompiledRuleset {
    /// Names of all active rules, injection first, for operator audit.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.injection
            .iter()
            .map(|r| r.name)
            .chain(self.suspicious.iter().map(|r| r.name))
            .collect()
    }

    /// The first injection rule matching `line`, if any.
    pub fn match_injection(&self, line: &str) -> Option<&CompiledRule<InjectionClass>> {
        self.injection.iter().find(|rule| rule.regex.is_match(line))
    }
}

fn build_regex(name: &str, pattern: &str) -> Result<Regex, ScrubError> {
    RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| ScrubError::RuleCompilationError(name.to_string(), e))
}

fn compile_table<C: Copy>(
    specs: &[RuleSpec<C>],
    errors: &mut Vec<ScrubError>,
) -> Vec<CompiledRule<C>> {
    specs
        .iter()
        .filter_map(|spec| match build_regex(spec.name, spec.pattern) {
            Ok(regex) => Some(CompiledRule { name: spec.name, class: spec.class, regex }),
            Err(e) => {
                errors.push(e);
                None
            }
        })
        .collect()
}

/// Compiles both tables, collecting every failure into one report rather
/// than stopping at the first.
fn compile_ruleset() -> Result<CompiledRuleset, ScrubError> {
    debug!(
        "Compiling rule tables (version {}): {} injection, {} suspicious",
        RULESET_VERSION,
        INJECTION_RULES.len(),
        SUSPICIOUS_RULES.len()
    );

    let sql_keywords = build_regex("sql_keyword_tagger", SQL_KEYWORD_PATTERN)?;

    let mut compilation_errors = Vec::new();
    let injection = compile_table(INJECTION_RULES, &mut compilation_errors);
    let suspicious = compile_table(SUSPICIOUS_RULES, &mut compilation_errors);

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        return Err(ScrubError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )));
    }

    debug!(
        "Finished compiling rules. Total compiled: {}.",
        injection.len() + suspicious.len()
    );

    Ok(CompiledRuleset { version: RULESET_VERSION, injection, suspicious, sql_keywords })
}

static COMPILED_RULESET: OnceCell<Arc<CompiledRuleset>> = OnceCell::new();

/// Gets the process-wide compiled rule set, compiling it on first use.
///
/// The tables are static, so one shared compilation serves every sanitizer
/// instance; the returned `Arc` is cheap to clone.
pub fn shared_ruleset() -> Result<Arc<CompiledRuleset>, ScrubError> {
    COMPILED_RULESET
        .get_or_try_init(|| compile_ruleset().map(Arc::new))
        .map(Arc::clone)
}
