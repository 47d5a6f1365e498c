//! Parsed record cache
//!
//! Reopening an export skips parsing when a completed parse for the same source is cached.
//! [`FileCache`] uses a two-file layout per source:
//! - `metadata.json`: JSON metadata (version, key, record count, creation time)
//! - `records.bin`: Bincode-serialized records
//!
//! Cache location: `$CHAT_EXPORT_CACHE_DIR`, or the platform cache directory
//! - macOS: `~/Library/Caches/chat-export-explorer/`
//! - Linux: `~/.cache/chat-export-explorer/`
//! - Windows: `%LOCALAPPDATA%\chat-export-explorer\`
//!
//! Media locators are session-scoped. Cached records keep the locators of the session that
//! parsed them; the loader rebinds them against the current session's media table.

pub mod metadata;
pub mod persistence;

pub use metadata::{CACHE_VERSION, CacheKey, CacheMetadata};
pub use persistence::{FileCache, MemoryCache, RecordCache};
