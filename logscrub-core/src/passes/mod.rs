//! The ordered defensive passes of the sanitization pipeline.
//!
//! Whole-content passes run first (`encoding`, `content`), then the
//! per-line passes (`line`, `json_repair`, `compression`) in the order the
//! orchestrator applies them. Each pass transforms text and records its
//! findings; none of them can fail.
//!
//! License: MIT OR APACHE 2.0

pub mod compression;
pub mod content;
pub mod encoding;
pub mod json_repair;
pub mod line;
