use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::media::Locator;
use crate::parsers::timestamp::normalize_timestamp;

/// One message from a chat export transcript.
///
/// `timestamp` is kept exactly as it appeared on the header line; use
/// [`MessageRecord::normalized_timestamp`] when a calendar value is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub timestamp: String,
    pub sender: String,
    pub text: String,
    #[serde(default)]
    pub media_locator: Option<Locator>,
    #[serde(default)]
    pub is_ephemeral: bool,
}

impl MessageRecord {
    pub fn new(timestamp: &str, sender: &str, text: String) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            sender: sender.to_string(),
            text,
            media_locator: None,
            is_ephemeral: false,
        }
    }

    /// Append a continuation line verbatim, always preceded by a newline
    pub fn push_line(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
    }

    /// Append text left over from an attachment line; no leading newline on an empty body
    pub fn append_text(&mut self, text: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(text);
    }

    /// Attach media unless a locator is already set
    pub fn attach_media(&mut self, locator: Locator) {
        if self.media_locator.is_none() {
            self.media_locator = Some(locator);
        }
    }

    pub fn has_media(&self) -> bool {
        self.media_locator.is_some()
    }

    pub fn normalized_timestamp(&self) -> Option<NaiveDateTime> {
        normalize_timestamp(&self.timestamp)
    }
}
