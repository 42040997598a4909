// logscrub-entropy/src/entropy/mod.rs
use libm::log2;

use crate::EntropyScore;

/// Calculates the Shannon entropy of a byte slice, in bits per byte.
///
/// Plain text logs sit well below 5 bits/byte; compressed or encrypted
/// payloads approach the 8 bits/byte ceiling. The sanitizer treats values
/// above its threshold as evidence that a decoded blob is not text at all.
pub fn shannon_entropy(data: &[u8]) -> EntropyScore {
    if data.is_empty() {
        return 0.0;
    }

    let mut frequencies = [0usize; 256];
    for &byte in data {
        frequencies[byte as usize] += 1;
    }

    let len = data.len() as f64;
    let mut entropy = 0.0;

    for &count in frequencies.iter() {
        if count > 0 {
            let p = count as f64 / len;
            entropy -= p * log2(p);
        }
    }

    entropy
}

/// Fraction of bytes that are printable ASCII, tab, newline, or CR.
///
/// A cheap second opinion next to [`shannon_entropy`]: base64 that merely
/// *encodes* text decodes to mostly printable bytes, while a compressed
/// stream does not.
pub fn printable_ratio(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 1.0;
    }
    let printable = data
        .iter()
        .filter(|&&b| (0x20..0x7f).contains(&b) || b == b'\t' || b == b'\n' || b == b'\r')
        .count();
    printable as f64 / data.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_empty() {
        assert_eq!(shannon_entropy(b""), 0.0);
    }

    #[test]
    fn test_entropy_zero_randomness() {
        assert_eq!(shannon_entropy(b"aaaaa"), 0.0);
    }

    #[test]
    fn test_entropy_uniform_bytes() {
        let entropy = shannon_entropy(b"abcdefgh");
        assert!((entropy - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_entropy_full_byte_range() {
        use alloc::vec::Vec;
        let all: Vec<u8> = (0..=255u8).collect();
        let entropy = shannon_entropy(&all);
        assert!((entropy - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_printable_ratio_text() {
        assert!(printable_ratio(b"hello world\n") > 0.99);
    }

    #[test]
    fn test_printable_ratio_binary() {
        let data = [0x00u8, 0x01, 0x02, 0x8f, 0xff, b'a'];
        assert!(printable_ratio(&data) < 0.2);
    }
}
