//! Embedded compressed-blob detection and decoding.
//!
//! Long lines that decode cleanly as base64 are checked for compression
//! signatures and, failing that, for near-ceiling Shannon entropy. Either
//! signal marks the line as compressed data, and a short decompression
//! cascade (gzip, zlib, raw deflate) tries to recover the original text.
//!
//! License: MIT OR APACHE 2.0

use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use log::debug;

use logscrub_entropy::entropy::{printable_ratio, shannon_entropy};
use logscrub_entropy::statistics::window_entropy_stats;

use crate::detection::{CorruptionType, Findings, SanitizationAction, Severity};

/// Lines shorter than this are never scanned; real compressed payloads of
/// interest are bigger, and short tokens false-positive constantly.
pub(crate) const MIN_SCAN_LEN: usize = 100;

/// Shannon entropy (bits/byte) above which decoded bytes are treated as
/// compressed even without a recognizable signature.
pub(crate) const ENTROPY_THRESHOLD: f64 = 7.5;

/// Window size for the entropy uniformity profile in detection details.
const ENTROPY_WINDOW: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Codec {
    Gzip,
    Zlib,
    Deflate,
}

impl Codec {
    fn name(self) -> &'static str {
        match self {
            Codec::Gzip => "gzip",
            Codec::Zlib => "zlib",
            Codec::Deflate => "deflate",
        }
    }
}

/// Why the decoded bytes were judged to be compressed.
#[derive(Debug)]
enum CompressionEvidence {
    Signature(&'static str),
    Entropy(f64),
}

/// Scans one line for an embedded compressed blob. Returns the replacement
/// text when a blob was found and successfully decompressed.
pub(crate) fn scan_line(
    line: &str,
    max_output: usize,
    line_no: usize,
    findings: &mut Findings,
) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.len() < MIN_SCAN_LEN {
        return None;
    }
    let decoded = BASE64.decode(trimmed).ok()?;

    let evidence = match compression_signature(&decoded) {
        Some(kind) => CompressionEvidence::Signature(kind),
        None => {
            let entropy = shannon_entropy(&decoded);
            if entropy <= ENTROPY_THRESHOLD || printable_ratio(&decoded) > 0.9 {
                return None;
            }
            CompressionEvidence::Entropy(entropy)
        }
    };

    let description = match evidence {
        CompressionEvidence::Signature(kind) => {
            format!("Base64 payload carries a {kind} signature")
        }
        CompressionEvidence::Entropy(entropy) => {
            let stats = window_entropy_stats(&decoded, ENTROPY_WINDOW);
            format!(
                "Base64 payload has entropy {entropy:.2} bits/byte (window mean {:.2}, deviation {:.2})",
                stats.mean, stats.std_dev
            )
        }
    };
    findings.detect(
        CorruptionType::CompressedData,
        Severity::Medium,
        format!("line {line_no}"),
        description,
        line,
        0.8,
    );

    match try_decompress(&decoded, max_output) {
        Some((codec, bytes)) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            debug!(
                "Decompressed {}-byte {} blob on line {line_no} to {} bytes",
                decoded.len(),
                codec.name(),
                text.len()
            );
            findings.act(
                SanitizationAction::Decompressed,
                format!("decompressed {} blob on line {line_no}", codec.name()),
            );
            Some(text)
        }
        None => None,
    }
}

/// Known compression magic bytes.
fn compression_signature(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        Some("gzip")
    } else if bytes.starts_with(b"PK\x03\x04") {
        Some("zip")
    } else if is_zlib_header(bytes) {
        Some("zlib")
    } else {
        None
    }
}

fn is_zlib_header(bytes: &[u8]) -> bool {
    bytes.len() >= 2
        && bytes[0] == 0x78
        && matches!(bytes[1], 0x01 | 0x5e | 0x9c | 0xda)
}

/// Tries each codec in order, bounding output size against decompression
/// bombs. Output past `max_output` counts as a failed attempt.
fn try_decompress(bytes: &[u8], max_output: usize) -> Option<(Codec, Vec<u8>)> {
    for codec in [Codec::Gzip, Codec::Zlib, Codec::Deflate] {
        let mut out = Vec::new();
        let ok = match codec {
            Codec::Gzip => bounded_read(GzDecoder::new(bytes), max_output, &mut out),
            Codec::Zlib => bounded_read(ZlibDecoder::new(bytes), max_output, &mut out),
            Codec::Deflate => bounded_read(DeflateDecoder::new(bytes), max_output, &mut out),
        };
        if ok && !out.is_empty() {
            return Some((codec, out));
        }
    }
    None
}

fn bounded_read(reader: impl Read, max_output: usize, out: &mut Vec<u8>) -> bool {
    let mut limited = reader.take(max_output as u64 + 1);
    match limited.read_to_end(out) {
        Ok(_) => out.len() <= max_output,
        Err(_) => false,
    }
}
