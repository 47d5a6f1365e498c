//! Bundle resolution: pick the transcript, materialize media, build the lookup table.
//!
//! # Transcript selection
//!
//! Among the `.txt` entries, in order of preference:
//! 1. An entry whose basename is exactly `_chat.txt` (the iOS export name)
//! 2. The first entry whose basename contains `chat` (case-insensitive)
//! 3. The entry with the longest basename (first one wins on a tie)
//!
//! Only basenames are compared: export folders are often named after the chat, which
//! would otherwise make every text file inside them match rule 2.
//!
//! Rule 3 is a best-effort default for exports with nonstandard naming.
//!
//! # Media
//!
//! Every other entry whose name carries an allow-listed media extension is read into the
//! session [`MediaStore`] and registered in the [`MediaTable`] under its verbatim and lowercase
//! basename. Reads run in parallel; registration happens afterwards in entry order so the
//! resulting table does not depend on thread timing. A failed entry is reported to the
//! [`DiagnosticSink`] and left out.

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::bundle::Bundle;
use super::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::LoadError;
use crate::models::{MediaStore, MediaTable};
use crate::parsers::attachment::is_media_name;
use crate::utils::{MAX_TRANSCRIPT_BYTES, basename, validate_entry_name};

/// Basename of the transcript in iOS exports
pub const CANONICAL_TRANSCRIPT_NAME: &str = "_chat.txt";

/// The selected transcript, decoded to text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Entry name inside the bundle
    pub name: String,
    pub text: String,
}

/// Everything a parse run needs from a bundle
#[derive(Debug)]
pub struct ResolvedBundle {
    pub transcript: Transcript,
    pub media: MediaTable,
    pub store: MediaStore,
}

fn is_text_entry(name: &str) -> bool {
    basename(name).to_lowercase().ends_with(".txt")
}

/// Pick the transcript entry from a list of entry names
///
/// Returns `None` when no entry is a `.txt` file.
///
/// # Examples
///
/// ```
/// use chat_export_explorer::archive::select_transcript;
///
/// let names = ["media/IMG_1.jpg", "notes.txt", "WhatsApp Chat with Bob.txt"];
/// assert_eq!(select_transcript(&names), Some("WhatsApp Chat with Bob.txt"));
/// assert_eq!(select_transcript(&["IMG_1.jpg"]), None);
/// ```
pub fn select_transcript<'a, S: AsRef<str>>(names: &'a [S]) -> Option<&'a str> {
    let candidates: Vec<&str> =
        names.iter().map(AsRef::as_ref).filter(|name| is_text_entry(name)).collect();

    if let Some(name) = candidates.iter().find(|name| basename(name) == CANONICAL_TRANSCRIPT_NAME) {
        return Some(*name);
    }

    if let Some(name) =
        candidates.iter().find(|name| basename(name).to_lowercase().contains("chat"))
    {
        return Some(*name);
    }

    // max_by_key keeps the last maximum, so fold to keep the first
    candidates.into_iter().fold(None, |best: Option<&str>, name| match best {
        Some(current) if basename(current).len() >= basename(name).len() => Some(current),
        _ => Some(name),
    })
}

/// Check the size limit and decode transcript bytes as UTF-8
///
/// Invalid UTF-8 sequences are replaced with U+FFFD.
pub(crate) fn decode_transcript(name: &str, bytes: Vec<u8>) -> Result<Transcript> {
    let size = bytes.len() as u64;
    if size > MAX_TRANSCRIPT_BYTES {
        return Err(LoadError::TranscriptTooLarge {
            name: name.to_string(),
            size,
            max: MAX_TRANSCRIPT_BYTES,
        }
        .into());
    }

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("Transcript {} is not valid UTF-8; invalid bytes replaced", name);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    Ok(Transcript { name: name.to_string(), text })
}

fn read_transcript(bundle: &dyn Bundle, name: &str) -> Result<Transcript> {
    let read_error = |source| LoadError::TranscriptRead { name: name.to_string(), source };

    if let Some(size) = bundle.entry_len(name).map_err(read_error)?
        && size > MAX_TRANSCRIPT_BYTES
    {
        return Err(LoadError::TranscriptTooLarge {
            name: name.to_string(),
            size,
            max: MAX_TRANSCRIPT_BYTES,
        }
        .into());
    }

    // The entry may grow between the size check and the read
    let bytes = bundle.read_entry_limited(name, MAX_TRANSCRIPT_BYTES).map_err(read_error)?;
    decode_transcript(name, bytes)
}

/// Resolve a bundle into its transcript and session media
///
/// # Errors
///
/// Returns [`LoadError::NoTranscriptFound`] if the bundle holds no `.txt` entry,
/// [`LoadError::TranscriptTooLarge`] if the transcript exceeds 256MB, and
/// [`LoadError::TranscriptRead`] if the transcript entry cannot be read. Media failures
/// are reported to `diagnostics` and never fail resolution.
pub fn resolve_bundle(
    bundle: &dyn Bundle,
    diagnostics: &dyn DiagnosticSink,
) -> Result<ResolvedBundle> {
    let names = bundle.entry_names();
    let transcript_name = select_transcript(&names)
        .ok_or_else(|| LoadError::NoTranscriptFound {
            bundle: bundle.name().to_string(),
            entries: names.len(),
        })?
        .to_string();
    debug!(bundle = bundle.name(), transcript = %transcript_name, "Selected transcript");

    let transcript = read_transcript(bundle, &transcript_name)?;

    let mut media_names = Vec::new();
    for name in &names {
        if *name == transcript_name || !is_media_name(basename(name)) {
            continue;
        }
        match validate_entry_name(name) {
            Ok(()) => media_names.push(name.as_str()),
            Err(e) => diagnostics.report(Diagnostic::SkippedEntry {
                entry: name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let extracted: Vec<(&str, std::io::Result<Vec<u8>>)> =
        media_names.into_par_iter().map(|name| (name, bundle.read_entry(name))).collect();

    let mut store = MediaStore::new();
    let mut media = MediaTable::new();
    let mut failures = 0usize;
    for (name, result) in extracted {
        match result {
            Ok(bytes) => {
                let file_name = basename(name);
                let locator = store.insert(file_name, bytes);
                media.register(file_name, locator);
            }
            Err(e) => {
                failures += 1;
                diagnostics.report(Diagnostic::AssetExtractionFailure {
                    entry: name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        bundle = bundle.name(),
        transcript = %transcript.name,
        media = store.len(),
        failures,
        "Resolved bundle"
    );

    Ok(ResolvedBundle { transcript, media, store })
}
