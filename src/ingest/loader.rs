//! Loading a chat export end to end.
//!
//! [`ChatLoader`] ties the pieces together: resolve the source into a transcript and media,
//! consult the record cache, otherwise run a scheduled parse and store the result. Only
//! completed runs reach the cache.

use std::path::Path;

use anyhow::{Result, bail};
use tracing::{debug, info};

use super::source::{Source, read_transcript_file};
use crate::archive::{Bundle, DiagnosticSink, ResolvedBundle, Transcript, resolve_bundle};
use crate::cache::{CacheKey, RecordCache};
use crate::models::{MediaStore, MediaTable, MessageRecord};
use crate::scheduler::{
    CancellationToken, ParseOptions, ParseScheduler, ParseStats, ProgressSink, RunOutcome,
    ThreadYield,
};

/// How a load should behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub parse: ParseOptions,
    pub use_cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { parse: ParseOptions::default(), use_cache: true }
    }
}

/// A fully loaded export
#[derive(Debug)]
pub struct LoadedChat {
    /// Name of the export (file or folder name)
    pub source_name: String,
    /// Name of the transcript inside the export
    pub transcript_name: String,
    pub records: Vec<MessageRecord>,
    pub media: MediaTable,
    pub store: MediaStore,
    pub from_cache: bool,
    /// Parse statistics; `None` when records came from the cache
    pub stats: Option<ParseStats>,
}

/// Loads exports, one at a time, through a shared scheduler and optional cache
pub struct ChatLoader<'c> {
    options: LoadOptions,
    cache: Option<&'c dyn RecordCache>,
    scheduler: ParseScheduler,
    cancellation: Option<CancellationToken>,
}

impl<'c> ChatLoader<'c> {
    pub fn new(options: LoadOptions, cache: Option<&'c dyn RecordCache>) -> Self {
        Self { options, cache, scheduler: ParseScheduler::new(), cancellation: None }
    }

    /// Parse runs started by this loader stop once `token` is cancelled
    ///
    /// A cancelled load returns an error and writes nothing to the cache. The token stays
    /// cancelled, so later loads through this loader fail too until a new token is set.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    /// Load a transcript file or unpacked export directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `path` is not a `.txt` file or a directory ([`LoadError::UnsupportedSource`])
    /// - A directory holds no transcript ([`LoadError::NoTranscriptFound`])
    /// - The transcript is over 256MB or unreadable
    /// - The parse run is cancelled
    ///
    /// [`LoadError::UnsupportedSource`]: crate::error::LoadError::UnsupportedSource
    /// [`LoadError::NoTranscriptFound`]: crate::error::LoadError::NoTranscriptFound
    pub fn load_path(
        &mut self,
        path: &Path,
        diagnostics: &dyn DiagnosticSink,
        sink: &mut dyn ProgressSink,
    ) -> Result<LoadedChat> {
        let source = Source::detect(path)?;
        let source_name = source.display_name();
        debug!(source = ?source, "Loading chat export");

        match source.open_directory()? {
            Some(bundle) => self.load_bundle_named(&source_name, &bundle, diagnostics, sink),
            None => {
                let transcript = read_transcript_file(source.path())?;
                let resolved = ResolvedBundle {
                    transcript,
                    media: MediaTable::new(),
                    store: MediaStore::new(),
                };
                self.load_resolved(&source_name, resolved, sink)
            }
        }
    }

    /// Load an already-open bundle
    pub fn load_bundle(
        &mut self,
        bundle: &dyn Bundle,
        diagnostics: &dyn DiagnosticSink,
        sink: &mut dyn ProgressSink,
    ) -> Result<LoadedChat> {
        let name = bundle.name().to_string();
        self.load_bundle_named(&name, bundle, diagnostics, sink)
    }

    /// Parse transcript text that has no media
    pub fn load_text(
        &mut self,
        name: &str,
        text: &str,
        sink: &mut dyn ProgressSink,
    ) -> Result<LoadedChat> {
        let resolved = ResolvedBundle {
            transcript: Transcript { name: name.to_string(), text: text.to_string() },
            media: MediaTable::new(),
            store: MediaStore::new(),
        };
        self.load_resolved(name, resolved, sink)
    }

    fn load_bundle_named(
        &mut self,
        source_name: &str,
        bundle: &dyn Bundle,
        diagnostics: &dyn DiagnosticSink,
        sink: &mut dyn ProgressSink,
    ) -> Result<LoadedChat> {
        let resolved = resolve_bundle(bundle, diagnostics)?;
        self.load_resolved(source_name, resolved, sink)
    }

    fn load_resolved(
        &mut self,
        source_name: &str,
        resolved: ResolvedBundle,
        sink: &mut dyn ProgressSink,
    ) -> Result<LoadedChat> {
        self.options.parse.validate()?;
        let ResolvedBundle { transcript, media, store } = resolved;
        let key = CacheKey::from_source(
            &format!("{}/{}", source_name, transcript.name),
            transcript.text.len() as u64,
        );
        let cache = if self.options.use_cache { self.cache } else { None };

        if let Some(cache) = cache
            && let Some(cached) = cache.get(&key)?
        {
            let records = rebind_records(cached, &media);
            info!(source = source_name, records = records.len(), "Loaded records from cache");
            for batch in records.chunks(self.options.parse.flush_every) {
                sink.on_batch(batch);
            }
            return Ok(LoadedChat {
                source_name: source_name.to_string(),
                transcript_name: transcript.name,
                records,
                media,
                store,
                from_cache: true,
                stats: None,
            });
        }

        let token = self.cancellation.clone().unwrap_or_default();
        let run =
            self.scheduler.start_with_token(&transcript.text, &media, self.options.parse, token)?;
        let (records, stats) = match run.run(&mut ThreadYield, sink) {
            RunOutcome::Completed { records, stats } => (records, stats),
            RunOutcome::Cancelled { parsed } => {
                bail!("Parsing {} was cancelled after {} records", source_name, parsed)
            }
        };

        if let Some(cache) = cache {
            cache.put(&key, &records)?;
        }

        Ok(LoadedChat {
            source_name: source_name.to_string(),
            transcript_name: transcript.name,
            records,
            media,
            store,
            from_cache: false,
            stats: Some(stats),
        })
    }
}

/// Point cached locators at the current session's media
///
/// Locators whose media is not part of this session are dropped.
pub fn rebind_records(records: Vec<MessageRecord>, media: &MediaTable) -> Vec<MessageRecord> {
    records
        .into_iter()
        .map(|mut record| {
            if let Some(locator) = record.media_locator.take() {
                record.media_locator = media.rebind(&locator);
                if record.media_locator.is_none() {
                    debug!(locator = %locator, "Cached media locator has no match in this session");
                }
            }
            record
        })
        .collect()
}
