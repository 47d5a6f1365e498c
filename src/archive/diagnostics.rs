use std::fmt;
use std::sync::Mutex;
use std::sync::mpsc::Sender;

use tracing::warn;

/// A non-fatal problem met while resolving a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A media entry could not be materialized; it is left out of the media table
    AssetExtractionFailure { entry: String, reason: String },
    /// An entry was ignored before extraction (e.g. an unsafe name)
    SkippedEntry { entry: String, reason: String },
}

impl Diagnostic {
    pub fn entry(&self) -> &str {
        match self {
            Self::AssetExtractionFailure { entry, .. } | Self::SkippedEntry { entry, .. } => entry,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetExtractionFailure { entry, reason } => {
                write!(f, "Failed to extract media entry {}: {}", entry, reason)
            }
            Self::SkippedEntry { entry, reason } => {
                write!(f, "Skipped bundle entry {}: {}", entry, reason)
            }
        }
    }
}

/// Side channel for non-fatal diagnostics
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `tracing` log at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        warn!(entry = diagnostic.entry(), "{}", diagnostic);
    }
}

/// Keeps every diagnostic for later inspection
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    items: Mutex<Vec<Diagnostic>>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.items.lock().map(|items| items.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectedDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut items) = self.items.lock() {
            items.push(diagnostic);
        }
    }
}

impl DiagnosticSink for Sender<Diagnostic> {
    fn report(&self, diagnostic: Diagnostic) {
        // A dropped receiver means nobody is listening any more
        let _ = self.send(diagnostic);
    }
}
