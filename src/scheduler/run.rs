//! Cooperative driver for [`advance`].
//!
//! A [`ParseRun`] owns the cursor for one transcript and performs one bounded slice per
//! [`ParseRun::step`]. Hosts with an event loop call `step` from their loop; everything
//! else can use [`ParseRun::run`], which calls a [`YieldPoint`] between slices.
//!
//! Cancellation is checked at the start of every step. A cancelled run performs no further
//! slices and never reports [`RunOutcome::Completed`], so callers persist nothing for it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use tracing::{debug, info};

use super::advance::{ParseCursor, ParseStats, advance};
use crate::models::{MediaTable, MessageRecord};

/// Default number of non-empty lines per slice
pub const DEFAULT_CHUNK_LINES: usize = 500;

/// Default number of completed records per progress batch
pub const DEFAULT_FLUSH_EVERY: usize = 1000;

/// Slice and progress sizing for a parse run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub chunk_lines: usize,
    pub flush_every: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { chunk_lines: DEFAULT_CHUNK_LINES, flush_every: DEFAULT_FLUSH_EVERY }
    }
}

impl ParseOptions {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_lines == 0 {
            bail!("chunk_lines must be at least 1");
        }
        if self.flush_every == 0 {
            bail!("flush_every must be at least 1");
        }
        Ok(())
    }
}

/// Shared cancellation flag for one parse run
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Hands control back to the host between slices
pub trait YieldPoint {
    fn yield_now(&mut self);
}

impl<F: FnMut()> YieldPoint for F {
    fn yield_now(&mut self) {
        self()
    }
}

/// Yield point that returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoYield;

impl YieldPoint for NoYield {
    fn yield_now(&mut self) {}
}

/// Yield point that lets other OS threads run
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadYield;

impl YieldPoint for ThreadYield {
    fn yield_now(&mut self) {
        std::thread::yield_now();
    }
}

/// Receives completed records as they are produced
pub trait ProgressSink {
    fn on_batch(&mut self, batch: &[MessageRecord]);
}

impl ProgressSink for () {
    fn on_batch(&mut self, _batch: &[MessageRecord]) {}
}

/// State of a run after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// More slices remain
    Pending,
    /// The whole transcript has been parsed
    Finished,
    /// The run was cancelled; no further slices will be processed
    Cancelled,
}

/// Final result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { records: Vec<MessageRecord>, stats: ParseStats },
    Cancelled { parsed: usize },
}

/// One in-flight parse of one transcript
pub struct ParseRun<'a> {
    transcript: &'a str,
    media: &'a MediaTable,
    options: ParseOptions,
    token: CancellationToken,
    cursor: ParseCursor,
    records: Vec<MessageRecord>,
    flushed: usize,
    slices: usize,
    status: StepStatus,
}

impl<'a> ParseRun<'a> {
    pub fn new(
        transcript: &'a str,
        media: &'a MediaTable,
        options: ParseOptions,
        token: CancellationToken,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            transcript,
            media,
            options,
            token,
            cursor: ParseCursor::new(),
            records: Vec::new(),
            flushed: 0,
            slices: 0,
            status: StepStatus::Pending,
        })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Completed records so far
    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    /// Record still open at the current slice boundary
    pub fn open_record(&self) -> Option<&MessageRecord> {
        self.cursor.open_record()
    }

    /// Fraction of transcript bytes consumed, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.transcript.is_empty() {
            return 1.0;
        }
        self.cursor.offset() as f64 / self.transcript.len() as f64
    }

    /// Run one slice and deliver any full progress batches to `sink`
    pub fn step(&mut self, sink: &mut dyn ProgressSink) -> StepStatus {
        if self.status != StepStatus::Pending {
            return self.status;
        }
        if self.token.is_cancelled() {
            debug!(slices = self.slices, "Parse run cancelled");
            self.status = StepStatus::Cancelled;
            return self.status;
        }

        let start = self.cursor.offset();
        let step = advance(self.transcript, start, self.options.chunk_lines, self.media, &mut self.cursor);
        self.slices += 1;
        self.records.extend(step.records);
        debug!(
            slice = self.slices,
            start,
            next = step.next_offset,
            records = self.records.len(),
            "Parsed slice"
        );

        while self.records.len() - self.flushed >= self.options.flush_every {
            let end = self.flushed + self.options.flush_every;
            sink.on_batch(&self.records[self.flushed..end]);
            self.flushed = end;
        }

        if step.next_offset >= self.transcript.len() {
            if self.flushed < self.records.len() {
                sink.on_batch(&self.records[self.flushed..]);
                self.flushed = self.records.len();
            }
            self.status = StepStatus::Finished;
        }
        self.status
    }

    /// Step until finished or cancelled, yielding to the host between slices
    pub fn run(mut self, yield_point: &mut dyn YieldPoint, sink: &mut dyn ProgressSink) -> RunOutcome {
        loop {
            match self.step(sink) {
                StepStatus::Pending => yield_point.yield_now(),
                StepStatus::Finished | StepStatus::Cancelled => break,
            }
        }
        self.into_outcome()
    }

    /// Consume the run; only a finished run yields its records
    pub fn into_outcome(self) -> RunOutcome {
        match self.status {
            StepStatus::Finished => {
                let stats = self.cursor.stats();
                info!(
                    records = self.records.len(),
                    slices = self.slices,
                    dropped = stats.dropped,
                    "Parse run complete"
                );
                RunOutcome::Completed { records: self.records, stats }
            }
            StepStatus::Pending | StepStatus::Cancelled => {
                RunOutcome::Cancelled { parsed: self.records.len() }
            }
        }
    }
}

/// Starts parse runs, cancelling the previous run whenever a new one begins
#[derive(Debug, Default)]
pub struct ParseScheduler {
    active: Option<CancellationToken>,
    generation: u64,
}

impl ParseScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of runs started so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Begin parsing a new transcript with a fresh cursor
    pub fn start<'a>(
        &mut self,
        transcript: &'a str,
        media: &'a MediaTable,
        options: ParseOptions,
    ) -> Result<ParseRun<'a>> {
        self.start_with_token(transcript, media, options, CancellationToken::new())
    }

    /// Like [`ParseScheduler::start`], but the run also stops when `token` is cancelled
    pub fn start_with_token<'a>(
        &mut self,
        transcript: &'a str,
        media: &'a MediaTable,
        options: ParseOptions,
        token: CancellationToken,
    ) -> Result<ParseRun<'a>> {
        self.cancel_active();
        let run = ParseRun::new(transcript, media, options, token.clone())?;
        self.active = Some(token);
        self.generation += 1;
        Ok(run)
    }

    /// Cancel the run started most recently, if any
    pub fn cancel_active(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}
