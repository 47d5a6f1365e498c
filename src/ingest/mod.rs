//! Loading chat exports from disk or memory
//!
//! # Error Handling Strategy
//!
//! - **Fatal conditions**: an unsupported path, a bundle without a transcript and an oversized
//!   or unreadable transcript abort the load with a [`LoadError`](crate::error::LoadError)
//!   inside `anyhow::Error`, so callers can downcast.
//!
//! - **Media failures**: unreadable media entries are reported to the
//!   [`DiagnosticSink`](crate::archive::DiagnosticSink) and the load carries on.
//!
//! - **Cache problems**: a stale or corrupt cache entry is a miss, never an error. Failing to
//!   write the cache is an error; use `use_cache: false` to opt out.

pub mod loader;
pub mod source;

pub use loader::{ChatLoader, LoadOptions, LoadedChat, rebind_records};
pub use source::{Source, read_transcript_file};
