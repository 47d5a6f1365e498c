//! Attachment filename detection and system-marker stripping.
//!
//! Exports reference media inline, e.g. `IMG-20230101-WA0001.jpg (file attached)` on Android or
//! `<attached: 00000012-PHOTO-2023-01-01-10-00-00.jpg>` on iOS. Detection is limited to an
//! allow-list of media extensions; the matched text keeps its original casing.

use std::sync::LazyLock;

use regex::Regex;

/// Extensions recognised as attachments, grouped by kind
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "heic", "bmp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "3gp", "avi", "mkv", "webm"];
pub const AUDIO_EXTENSIONS: &[&str] = &["opus", "ogg", "mp3", "m4a", "aac", "wav", "amr"];
pub const DOCUMENT_EXTENSIONS: &[&str] =
    &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv", "zip"];
pub const STICKER_EXTENSIONS: &[&str] = &["webp"];
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "vcf"];

fn extension_alternation() -> String {
    [
        IMAGE_EXTENSIONS,
        VIDEO_EXTENSIONS,
        AUDIO_EXTENSIONS,
        DOCUMENT_EXTENSIONS,
        STICKER_EXTENSIONS,
        TEXT_EXTENSIONS,
    ]
    .concat()
    .join("|")
}

static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)[\w\-.]+\.(?:{})\b", extension_alternation()))
        .expect("attachment filename pattern is valid")
});

static MEDIA_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\.(?:{})$", extension_alternation()))
        .expect("media name pattern is valid")
});

static ATTACHED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*attached:[^>]*>").expect("attached marker pattern is valid")
});

static SYSTEM_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)\(\s*file attached\s*\)", r"(?i)<?\s*media omitted\s*>?", r"\[[^\]]*\]"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("system marker pattern is valid"))
        .collect()
});

/// Characters trimmed from what is left of a line after stripping
fn is_residual_punctuation(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '-' | ':' | ',' | ';' | '<' | '>' | '(' | ')' | '[' | ']' | '\u{200e}' | '\u{200f}'
        )
}

/// First allow-listed attachment filename in `line`, with its original casing
pub fn find_attachment(line: &str) -> Option<&str> {
    FILENAME_PATTERN.find(line).map(|m| m.as_str())
}

/// Whether a bundle entry basename carries an allow-listed media extension
pub fn is_media_name(basename: &str) -> bool {
    MEDIA_NAME_PATTERN.is_match(basename)
}

/// Remove system markers and `filename` from `text`, then trim leftover punctuation
pub fn strip_attachment_text(text: &str, filename: &str) -> String {
    // `<attached: name>` wraps the filename; removing the marker removes the name with it
    let marker_held_name = ATTACHED_MARKER.find_iter(text).any(|m| m.as_str().contains(filename));
    let without_attached = ATTACHED_MARKER.replace_all(text, "");
    let mut stripped = if marker_held_name {
        without_attached.into_owned()
    } else {
        without_attached.replacen(filename, "", 1)
    };
    for marker in SYSTEM_MARKERS.iter() {
        stripped = marker.replace_all(&stripped, "").into_owned();
    }
    stripped.trim_matches(is_residual_punctuation).to_string()
}
