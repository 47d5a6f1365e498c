//! Fatal load errors.
//!
//! Recoverable problems (a media entry that cannot be read, a junk line) never surface here;
//! they go to a [`DiagnosticSink`](crate::archive::DiagnosticSink) or are silently counted.

use std::path::PathBuf;

/// Conditions that abort loading a chat export
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No transcript found in bundle '{bundle}' ({entries} entries, none is a .txt file)")]
    NoTranscriptFound { bundle: String, entries: usize },

    #[error("Transcript too large: {name} ({size} bytes, max {max} bytes)")]
    TranscriptTooLarge { name: String, size: u64, max: u64 },

    #[error("Failed to read transcript {name}: {source}")]
    TranscriptRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Unsupported source: {} (expected a .txt transcript or an unpacked export directory)",
        path.display()
    )]
    UnsupportedSource { path: PathBuf },
}
