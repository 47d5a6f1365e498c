//! Header/continuation classification for transcript lines.
//!
//! # Grammar
//!
//! ```text
//! header    := ["["] date sep time [meridiem] ["]"] [hyphen | colon] sender ":" body
//! date      := num ("/" | "." | "-") num ("/" | "." | "-") num
//! sep       := [","] whitespace+
//! time      := H ":" MM [":" SS]
//! meridiem  := ("A" | "P") ["."] [" "] "M" ["."]     (case-insensitive)
//! sender    := one or more characters up to the first ":"
//! ```
//!
//! This covers the common regional variants:
//!
//! ```text
//! [1/2/23, 10:00:00 AM] Alice: Hello        (iOS)
//! 1/2/23, 10:00 - Alice: Hello              (Android)
//! 02.01.23, 10:00 - Alice: Hello            (dotted dates)
//! ```
//!
//! Anything else (including system notices without a sender colon) is a continuation line.
//! A matched header whose sender trims to nothing is also a continuation.

use std::sync::LazyLock;

use regex::Regex;

static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\[?",
        r"(?P<timestamp>\d{1,4}[/.\-]\d{1,2}[/.\-]\d{1,4},?\s+\d{1,2}:\d{2}(?::\d{2})?",
        r"(?:\s*[AaPp]\.?\s?[Mm]\.?)?)",
        r"\]?\s*(?:[-–:]\s*)?",
        r"(?P<sender>[^:]+):",
        r"(?P<body>.*)$",
    ))
    .expect("header pattern is valid")
});

/// Classification of one non-empty transcript line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Starts a new message
    Header { timestamp: &'a str, sender: &'a str, body: &'a str },
    /// Belongs to the previous message; carries the line unmodified
    Continuation(&'a str),
}

/// Trim whitespace and directional marks that iOS exports put around lines
pub fn normalize_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{200e}' || c == '\u{200f}')
}

/// Classify a trimmed, non-empty line
pub fn classify_line(line: &str) -> LineKind<'_> {
    let Some(captures) = HEADER_PATTERN.captures(line) else {
        return LineKind::Continuation(line);
    };

    let (Some(timestamp), Some(sender), Some(body)) =
        (captures.name("timestamp"), captures.name("sender"), captures.name("body"))
    else {
        return LineKind::Continuation(line);
    };

    let timestamp = timestamp.as_str().trim();
    let sender = normalize_line(sender.as_str());
    if sender.is_empty() || timestamp.is_empty() {
        return LineKind::Continuation(line);
    }

    LineKind::Header { timestamp, sender, body: body.as_str().trim() }
}
