//! Incremental transcript parsing in bounded slices
//!
//! [`advance`] is the single parse primitive: it processes at most a given number of
//! non-empty lines and returns the records completed along the way, carrying the open
//! record across calls in a [`ParseCursor`]. Any split of a transcript into slices yields
//! the same records as one unbounded call.
//!
//! [`ParseRun`] and [`ParseScheduler`] drive `advance` cooperatively: one slice per step,
//! a pluggable [`YieldPoint`] between slices, cancellation checked before every slice, and
//! progress delivered to a [`ProgressSink`] in fixed-size batches.

pub mod advance;
pub mod run;

pub use advance::{Advance, ParseCursor, ParseStats, advance};
pub use run::{
    CancellationToken, DEFAULT_CHUNK_LINES, DEFAULT_FLUSH_EVERY, NoYield, ParseOptions, ParseRun,
    ParseScheduler, ProgressSink, RunOutcome, StepStatus, ThreadYield, YieldPoint,
};
