//! Chat Export Explorer - Parse exported chat transcripts into message records
//!
//! This library turns a chat export (a plain transcript, or a bundle of the transcript plus
//! its media) into an ordered sequence of [`MessageRecord`]s. It supports:
//!
//! - Header/continuation line classification across regional export variants
//! - Day/month disambiguation of numeric dates
//! - Attachment detection and case-insensitive media lookup
//! - Chunked, cancellable parsing whose output does not depend on the chunk size
//! - A record cache so reopening an export skips parsing
//!
//! # Example
//!
//! ```
//! use chat_export_explorer::{ChatLoader, LoadOptions};
//!
//! let transcript = "[13/05/2023, 10:00:00] Alice: Hello\nsecond line\n";
//! let mut loader = ChatLoader::new(LoadOptions::default(), None);
//! let chat = loader.load_text("_chat.txt", transcript, &mut ())?;
//!
//! assert_eq!(chat.records.len(), 1);
//! assert_eq!(chat.records[0].text, "Hello\nsecond line");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod archive;
pub mod cache;
pub mod cli;
pub mod error;
pub mod filters;
pub mod ingest;
pub mod models;
pub mod parsers;
pub mod scheduler;
pub mod utils;

// Re-export commonly used types
pub use archive::{Bundle, DirectoryBundle, MemoryBundle, resolve_bundle};
pub use error::LoadError;
pub use ingest::{ChatLoader, LoadOptions, LoadedChat};
pub use models::{Locator, MediaTable, MessageRecord};
pub use scheduler::{ParseCursor, ParseOptions, advance};
