//! Whole-content passes: size ceiling, binary-data detection, null-byte
//! removal, and control-character stripping.
//!
//! These run on the full payload before any line splitting, because later
//! passes assume they are looking at bounded, text-shaped input.
//!
//! License: MIT OR APACHE 2.0

use log::debug;

use crate::detection::{CorruptionType, Findings, SanitizationAction, Severity};

/// Ratio of control characters above which content is considered binary.
const BINARY_RATIO_THRESHOLD: f64 = 0.10;

/// Maximum byte offsets listed in a null-byte detection location.
const MAX_LISTED_OFFSETS: usize = 10;

/// Truncates content exceeding `max_size` bytes, on a char boundary.
pub(crate) fn enforce_size_limit(content: String, max_size: usize, findings: &mut Findings) -> String {
    if content.len() <= max_size {
        return content;
    }

    let mut cut = max_size;
    while cut > 0 && !content.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = content[..cut].to_string();
    debug!("Content truncated from {} to {} bytes", content.len(), truncated.len());
    findings.detect(
        CorruptionType::OversizedEntry,
        Severity::Medium,
        "entire_content",
        format!("Content size {} exceeds limit {max_size}", content.len()),
        &truncated,
        1.0,
    );
    findings.act(
        SanitizationAction::Truncated,
        format!("truncated content from {} to {cut} bytes", content.len()),
    );
    truncated
}

/// Detects binary content by control-character ratio, corroborated by
/// magic-byte sniffing of the original input, and strips the offending
/// characters when the threshold is crossed.
pub(crate) fn binary_pass(content: String, raw_prefix: &[u8], findings: &mut Findings) -> String {
    let ratio = control_char_ratio(&content);
    if ratio <= BINARY_RATIO_THRESHOLD {
        return content;
    }

    let sniffed = sniff_magic(raw_prefix);
    let severity = if sniffed.is_some() { Severity::Critical } else { Severity::High };
    let description = match sniffed {
        Some(kind) => format!(
            "Content is {:.0}% control characters and carries a {kind} signature",
            ratio * 100.0
        ),
        None => format!("Content is {:.0}% control characters", ratio * 100.0),
    };
    findings.detect(
        CorruptionType::BinaryData,
        severity,
        "entire_content",
        description,
        &content,
        (ratio * 2.0).min(1.0),
    );

    let (cleaned, removed) = strip_control_chars(&content);
    if removed > 0 {
        findings.act(
            SanitizationAction::Sanitized,
            format!("removed {removed} binary characters"),
        );
    }
    cleaned
}

/// Detects and removes null bytes. Separate from the general control strip:
/// null bytes corrupt C-style string handling in downstream shippers even
/// when the overall control-character ratio is low, so they get their own
/// detection with byte offsets and their own removal action.
pub(crate) fn null_byte_pass(content: String, findings: &mut Findings) -> String {
    let offsets: Vec<usize> = content
        .bytes()
        .enumerate()
        .filter(|(_, b)| *b == 0)
        .map(|(i, _)| i)
        .collect();
    if offsets.is_empty() {
        return content;
    }

    let location = if offsets.len() > MAX_LISTED_OFFSETS {
        format!(
            "byte offsets {:?} (and {} more)",
            &offsets[..MAX_LISTED_OFFSETS],
            offsets.len() - MAX_LISTED_OFFSETS
        )
    } else {
        format!("byte offsets {offsets:?}")
    };
    findings.detect(
        CorruptionType::NullBytes,
        Severity::High,
        location,
        format!("Found {} null byte(s)", offsets.len()),
        &content,
        1.0,
    );
    findings.act(
        SanitizationAction::Removed,
        format!("removed {} null byte(s)", offsets.len()),
    );
    content.replace('\0', "")
}

/// Unconditional control-character strip. Runs even when the binary-ratio
/// threshold was not crossed, so sparse control bytes still get cleaned.
pub(crate) fn control_char_pass(content: String, findings: &mut Findings) -> String {
    let (cleaned, removed) = strip_control_chars(&content);
    if removed == 0 {
        return content;
    }

    findings.detect(
        CorruptionType::ControlCharacters,
        Severity::Medium,
        "entire_content",
        format!("Found {removed} control character(s)"),
        &content,
        0.9,
    );
    findings.act(
        SanitizationAction::Sanitized,
        format!("removed {removed} control character(s)"),
    );
    cleaned
}

/// Fraction of characters with code point < 0x20, excluding tab/newline/CR.
fn control_char_ratio(content: &str) -> f64 {
    if content.is_empty() {
        return 0.0;
    }
    let total = content.chars().count();
    let control = content.chars().filter(|c| is_forbidden_control(*c)).count();
    control as f64 / total as f64
}

/// Removes every forbidden control character, returning the cleaned text
/// and how many characters were dropped.
fn strip_control_chars(content: &str) -> (String, usize) {
    let mut cleaned = String::with_capacity(content.len());
    let mut removed = 0usize;
    for c in content.chars() {
        if is_forbidden_control(c) {
            removed += 1;
        } else {
            cleaned.push(c);
        }
    }
    (cleaned, removed)
}

fn is_forbidden_control(c: char) -> bool {
    (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r'
}

/// Best-effort file-type sniff over the first bytes of the raw input.
/// Returns a label only for formats that are definitively not text logs.
pub(crate) fn sniff_magic(prefix: &[u8]) -> Option<&'static str> {
    const MAGICS: &[(&[u8], &str)] = &[
        (&[0x7f, b'E', b'L', b'F'], "ELF executable"),
        (&[0x89, b'P', b'N', b'G'], "PNG image"),
        (&[0xff, 0xd8, 0xff], "JPEG image"),
        (b"GIF8", "GIF image"),
        (b"%PDF", "PDF document"),
        (&[0x1f, 0x8b], "gzip stream"),
        (b"PK\x03\x04", "zip archive"),
        (&[0xca, 0xfe, 0xba, 0xbe], "Mach-O/class binary"),
    ];
    MAGICS
        .iter()
        .find(|(magic, _)| prefix.starts_with(magic))
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit_truncates_and_records() {
        let mut findings = Findings::default();
        let out = enforce_size_limit("x".repeat(100), 10, &mut findings);
        assert_eq!(out.len(), 10);
        assert_eq!(findings.detections[0].corruption_type, CorruptionType::OversizedEntry);
        assert_eq!(findings.actions[0].action, SanitizationAction::Truncated);
    }

    #[test]
    fn size_limit_respects_char_boundary() {
        let mut findings = Findings::default();
        // 'é' is two bytes; a cut at 3 would split the second one.
        let out = enforce_size_limit("éé".to_string(), 3, &mut findings);
        assert_eq!(out, "é");
    }

    #[test]
    fn under_limit_content_is_untouched() {
        let mut findings = Findings::default();
        let out = enforce_size_limit("short".to_string(), 100, &mut findings);
        assert_eq!(out, "short");
        assert!(findings.detections.is_empty());
    }

    #[test]
    fn binary_heavy_content_is_flagged_and_stripped() {
        let mut findings = Findings::default();
        let content: String = "\x01\x02\x03ok".to_string();
        let out = binary_pass(content, b"", &mut findings);
        assert_eq!(out, "ok");
        let d = &findings.detections[0];
        assert_eq!(d.corruption_type, CorruptionType::BinaryData);
        assert_eq!(d.severity, Severity::High);
        assert_eq!(d.confidence, 1.0); // ratio 0.6, doubled and clamped
    }

    #[test]
    fn magic_signature_upgrades_to_critical() {
        let mut findings = Findings::default();
        let content = "\x01\x02\x03\x04rest".to_string();
        let out = binary_pass(content, &[0x7f, b'E', b'L', b'F', 0, 0], &mut findings);
        assert_eq!(out, "rest");
        assert_eq!(findings.detections[0].severity, Severity::Critical);
        assert!(findings.detections[0].description.contains("ELF"));
    }

    #[test]
    fn sparse_control_bytes_skip_binary_but_not_control_pass() {
        let mut findings = Findings::default();
        let content = format!("{}\x01", "a".repeat(99));
        let after_binary = binary_pass(content, b"", &mut findings);
        assert!(findings.detections.is_empty());

        let out = control_char_pass(after_binary, &mut findings);
        assert!(!out.contains('\x01'));
        assert_eq!(findings.detections[0].corruption_type, CorruptionType::ControlCharacters);
    }

    #[test]
    fn tab_newline_cr_are_preserved() {
        let mut findings = Findings::default();
        let out = control_char_pass("a\tb\nc\r\n".to_string(), &mut findings);
        assert_eq!(out, "a\tb\nc\r\n");
        assert!(findings.detections.is_empty());
    }

    #[test]
    fn null_bytes_get_offsets_and_removal() {
        let mut findings = Findings::default();
        let out = null_byte_pass("\0a\0b".to_string(), &mut findings);
        assert_eq!(out, "ab");
        let d = &findings.detections[0];
        assert_eq!(d.corruption_type, CorruptionType::NullBytes);
        assert_eq!(d.severity, Severity::High);
        assert_eq!(d.confidence, 1.0);
        assert!(d.location.contains("[0, 2]"));
        assert_eq!(findings.actions[0].action, SanitizationAction::Removed);
    }

    #[test]
    fn many_null_offsets_are_elided() {
        let mut findings = Findings::default();
        let content = "\0".repeat(50);
        null_byte_pass(content, &mut findings);
        assert!(findings.detections[0].location.contains("and 40 more"));
    }

    #[test]
    fn sniff_recognizes_common_formats() {
        assert_eq!(sniff_magic(&[0x1f, 0x8b, 0x08]), Some("gzip stream"));
        assert_eq!(sniff_magic(b"%PDF-1.7"), Some("PDF document"));
        assert_eq!(sniff_magic(b"plain text"), None);
    }
}
