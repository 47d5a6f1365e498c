//! Message assembly: turns classified lines into [`MessageRecord`]s.
//!
//! The assembler keeps no state of its own. The open record (the one still eligible for
//! continuation text) lives in an `Option<MessageRecord>` owned by the caller, so the same
//! open record can be carried from one parse slice to the next. A record leaves the open
//! slot, untouched from then on, when the next header line arrives.

use super::attachment::{find_attachment, strip_attachment_text};
use super::line::{LineKind, classify_line};
use crate::models::{MediaTable, MessageRecord};

const VIEW_ONCE_MARKER: &str = "view once";

/// What happened to one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A header line opened a new record
    Started,
    /// A continuation line extended the open record
    Extended,
    /// A continuation line arrived with no open record and was dropped
    Dropped,
}

fn is_view_once(body: &str) -> bool {
    body.to_lowercase().contains(VIEW_ONCE_MARKER)
}

/// Feed one trimmed, non-empty line into the assembler.
///
/// When a header supersedes the open record, the superseded record is pushed to `closed`.
pub fn assemble_line(
    line: &str,
    media: &MediaTable,
    open: &mut Option<MessageRecord>,
    closed: &mut Vec<MessageRecord>,
) -> LineOutcome {
    match classify_line(line) {
        LineKind::Header { timestamp, sender, body } => {
            let record = start_record(line, timestamp, sender, body, media);
            if let Some(previous) = open.replace(record) {
                closed.push(previous);
            }
            LineOutcome::Started
        }
        LineKind::Continuation(text) => match open.as_mut() {
            Some(record) => {
                extend_record(record, text, media);
                LineOutcome::Extended
            }
            None => LineOutcome::Dropped,
        },
    }
}

fn start_record(
    line: &str,
    timestamp: &str,
    sender: &str,
    body: &str,
    media: &MediaTable,
) -> MessageRecord {
    let mut record = match find_attachment(line) {
        Some(filename) => {
            let mut record =
                MessageRecord::new(timestamp, sender, strip_attachment_text(body, filename));
            if let Some(locator) = media.lookup(filename) {
                record.attach_media(locator.clone());
            }
            record
        }
        None => MessageRecord::new(timestamp, sender, body.to_string()),
    };
    record.is_ephemeral = is_view_once(body);
    record
}

fn extend_record(record: &mut MessageRecord, text: &str, media: &MediaTable) {
    let Some(filename) = find_attachment(text) else {
        record.push_line(text);
        return;
    };

    if let Some(locator) = media.lookup(filename) {
        record.attach_media(locator.clone());
    }
    let residual = strip_attachment_text(text, filename);
    if !residual.is_empty() {
        record.append_text(&residual);
    }
}
