//! Encoding normalization: raw bytes in, valid UTF-8 text out, always.
//!
//! Strict UTF-8 is tried first and is the silent happy path. Anything else
//! goes through charset detection and a replacement-character decode; the
//! result is reported as an `encoding-error` detection, never as a failure.
//!
//! License: MIT OR APACHE 2.0

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::debug;

use crate::detection::{CorruptionType, Findings, SanitizationAction, Severity};

/// Decodes `bytes` to text, recording an `encoding-error` detection when
/// the input was not valid UTF-8.
pub(crate) fn normalize_input(bytes: &[u8], findings: &mut Findings) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => decode_with_guess(bytes, findings),
    }
}

fn decode_with_guess(bytes: &[u8], findings: &mut Findings) -> String {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let (guessed, reliable) = detector.guess_assess(None, true);

    // The detector answering UTF-8 for bytes that already failed a strict
    // UTF-8 decode means it found nothing better: the guess itself failed.
    if guessed == UTF_8 {
        let (decoded, _, _) = WINDOWS_1252.decode(bytes);
        let decoded = decoded.into_owned();
        debug!("Encoding guess failed; decoded {} bytes as windows-1252", bytes.len());
        findings.detect(
            CorruptionType::EncodingError,
            Severity::High,
            "entire_content",
            "Charset detection found no plausible encoding; decoded as windows-1252 with replacement characters",
            &decoded,
            0.5,
        );
        findings.act(
            SanitizationAction::Decoded,
            "decoded undetectable input as windows-1252",
        );
        return decoded;
    }

    let (decoded, used, _) = decode_replacing(guessed, bytes);
    let confidence = if reliable { 0.9 } else { 0.6 };
    let severity = if confidence >= 0.8 { Severity::Low } else { Severity::Medium };
    debug!(
        "Non-UTF-8 input: decoded {} bytes as {} (reliable={})",
        bytes.len(),
        used.name(),
        reliable
    );
    findings.detect(
        CorruptionType::EncodingError,
        severity,
        "entire_content",
        format!("Input was not UTF-8; decoded as {} (detector confidence {confidence})", used.name()),
        &decoded,
        confidence,
    );
    findings.act(
        SanitizationAction::Decoded,
        format!("decoded input from {}", used.name()),
    );
    decoded
}

fn decode_replacing(encoding: &'static Encoding, bytes: &[u8]) -> (String, &'static Encoding, bool) {
    let (cow, used, had_errors) = encoding.decode(bytes);
    (cow.into_owned(), used, had_errors)
}
