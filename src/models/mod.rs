//! Data models for parsed chat exports.
//!
//! - [`MessageRecord`] - One message: raw timestamp, sender, body, optional media, view-once flag
//! - [`Locator`] - Session-scoped reference to a resolved media blob
//! - [`MediaTable`] - Attachment basename → locator lookup (case-insensitive)
//! - [`MediaStore`] - Materialized media bytes addressable by locator
//!
//! Records derive serde traits so they can be written to the record cache and printed as JSON.

pub mod media;
pub mod message;

pub use media::{Locator, MediaStore, MediaTable};
pub use message::MessageRecord;
