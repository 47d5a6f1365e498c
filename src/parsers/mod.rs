//! Transcript parsers for plain-text chat exports
//!
//! # Error Handling Strategy
//!
//! Parsing is total over arbitrary text: no function in this module returns an error.
//!
//! - **Header lines**: Lines matching the timestamp/sender grammar ([`line`]) open a new record.
//!
//! - **Continuation lines**: Everything else extends the open record. With no open record
//!   (junk before the first header) the line is dropped and counted, never reported as an error.
//!
//! - **Attachments**: Filenames are detected with an extension allow-list ([`attachment`]) and
//!   resolved against the session's media table. An unresolved filename leaves the record
//!   without media; it is not a failure.
//!
//! - **Dates**: Ambiguous day/month order is resolved deterministically ([`timestamp`]).
//!   Timestamps are stored raw and only normalized at filter/display boundaries.

pub mod assembler;
pub mod attachment;
pub mod line;
pub mod timestamp;

pub use assembler::{LineOutcome, assemble_line};
pub use attachment::find_attachment;
pub use line::{LineKind, classify_line};
pub use timestamp::{interpret_date, normalize_timestamp, resolve_day_month};
