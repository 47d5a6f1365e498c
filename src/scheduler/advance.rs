use tracing::trace;

use crate::models::{MediaTable, MessageRecord};
use crate::parsers::assembler::{LineOutcome, assemble_line};
use crate::parsers::line::normalize_line;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Line counters for one parse run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Non-empty lines processed
    pub lines: usize,
    pub headers: usize,
    pub continuations: usize,
    /// Continuation lines seen before any header
    pub dropped: usize,
}

/// State carried from one [`advance`] call to the next.
///
/// Holds the byte offset of the next unread line and the open record. A fresh cursor
/// is created for every transcript; a cursor must not be reused across transcripts.
#[derive(Debug, Clone, Default)]
pub struct ParseCursor {
    offset: usize,
    open: Option<MessageRecord>,
    stats: ParseStats,
}

impl ParseCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The record still receiving continuation lines, if any
    pub fn open_record(&self) -> Option<&MessageRecord> {
        self.open.as_ref()
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Whether every byte of `transcript` has been consumed
    pub fn is_finished(&self, transcript: &str) -> bool {
        self.offset >= transcript.len() && self.open.is_none()
    }

    /// Advance from the cursor's own offset
    pub fn advance(
        &mut self,
        transcript: &str,
        line_budget: usize,
        media: &MediaTable,
    ) -> Advance {
        let start = self.offset;
        advance(transcript, start, line_budget, media, self)
    }
}

/// Result of one [`advance`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Byte offset of the next unread line; equals `transcript.len()` at the end
    pub next_offset: usize,
    /// Records completed during this call, in transcript order
    pub records: Vec<MessageRecord>,
}

impl Advance {
    pub fn is_complete(&self, transcript: &str) -> bool {
        self.next_offset >= transcript.len()
    }
}

fn snap_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset
}

/// Process at most `line_budget` non-empty lines of `transcript` starting at `start_offset`.
///
/// Records are returned once they can no longer change: when a later header supersedes
/// them, or when the end of the transcript is reached. Splitting a transcript into any
/// number of calls therefore yields the same records, in the same order, as one call
/// with an unbounded budget.
///
/// Blank lines are skipped without counting against the budget. A budget of zero
/// consumes nothing. Offsets inside a multi-byte character are moved forward to the next
/// character boundary.
pub fn advance(
    transcript: &str,
    start_offset: usize,
    line_budget: usize,
    media: &MediaTable,
    cursor: &mut ParseCursor,
) -> Advance {
    let mut offset = snap_to_char_boundary(transcript, start_offset);
    let mut records = Vec::new();
    let mut processed = 0;

    if offset == 0 && transcript.starts_with(BYTE_ORDER_MARK) {
        offset = BYTE_ORDER_MARK.len_utf8();
    }

    while offset < transcript.len() && processed < line_budget {
        let rest = &transcript[offset..];
        let (raw_line, consumed) = match rest.find('\n') {
            Some(newline) => (&rest[..newline], newline + 1),
            None => (rest, rest.len()),
        };
        offset += consumed;

        let line = normalize_line(raw_line);
        if line.is_empty() {
            continue;
        }
        processed += 1;
        cursor.stats.lines += 1;

        match assemble_line(line, media, &mut cursor.open, &mut records) {
            LineOutcome::Started => cursor.stats.headers += 1,
            LineOutcome::Extended => cursor.stats.continuations += 1,
            LineOutcome::Dropped => {
                cursor.stats.dropped += 1;
                trace!(offset, "Dropped continuation line with no open record");
            }
        }
    }

    // Trailing blank lines would otherwise leave a run one empty slice short of the end
    while offset < transcript.len() {
        let rest = &transcript[offset..];
        let line_end = rest.find('\n').map(|n| n + 1).unwrap_or(rest.len());
        if !normalize_line(&rest[..line_end]).is_empty() {
            break;
        }
        offset += line_end;
    }

    if offset >= transcript.len() {
        records.extend(cursor.open.take());
    }

    cursor.offset = offset;
    Advance { next_offset: offset, records }
}
