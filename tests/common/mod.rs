//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chat_export_explorer::MessageRecord;
use chat_export_explorer::scheduler::ProgressSink;
use tempfile::TempDir;

/// Progress sink that remembers the size of every delivered batch
#[derive(Debug, Default)]
pub struct BatchSizes(pub Vec<usize>);

impl BatchSizes {
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

impl ProgressSink for BatchSizes {
    fn on_batch(&mut self, batch: &[MessageRecord]) {
        self.0.push(batch.len());
    }
}

/// Builder for unpacked export directories
pub struct ExportDirBuilder {
    temp_dir: TempDir,
}

impl ExportDirBuilder {
    /// Create a new builder with an empty export directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add the transcript as `_chat.txt`
    pub fn with_transcript(self, content: &str) -> Self {
        self.with_file("_chat.txt", content.as_bytes())
    }

    /// Add a file at a `/`-separated relative path, creating parent directories
    pub fn with_file(self, relative: &str, bytes: &[u8]) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, bytes).expect("Failed to write export file");
        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ExportDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a standalone transcript into `dir` and return its path
pub fn write_transcript(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write transcript");
    path
}

/// Date and time styles seen in real exports
#[derive(Debug, Clone, Copy)]
pub enum HeaderStyle {
    /// `[13/05/2023, 10:00:00] Alice: hi`
    Bracketed,
    /// `13/05/2023, 10:00 - Alice: hi`
    Dashed,
    /// `5/13/23, 9:41 PM - Alice: hi`
    TwelveHour,
}

/// Builder for transcript text
pub struct TranscriptBuilder {
    style: HeaderStyle,
    lines: Vec<String>,
    minute: u32,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self { style: HeaderStyle::Bracketed, lines: Vec::new(), minute: 0 }
    }

    pub fn style(mut self, style: HeaderStyle) -> Self {
        self.style = style;
        self
    }

    fn header_prefix(&self) -> String {
        // Wraps every 12 hours so large transcripts keep valid times
        let hour = (self.minute / 60) % 12;
        let minute = self.minute % 60;
        match self.style {
            HeaderStyle::Bracketed => format!("[13/05/2023, {:02}:{:02}:00]", hour + 10, minute),
            HeaderStyle::Dashed => format!("13/05/2023, {:02}:{:02} -", hour + 10, minute),
            HeaderStyle::TwelveHour => format!("5/13/23, {}:{:02} PM -", hour + 1, minute),
        }
    }

    /// Add a message header line; each message is one minute after the previous one
    pub fn message(mut self, sender: &str, body: &str) -> Self {
        let line = format!("{} {}: {}", self.header_prefix(), sender, body);
        self.lines.push(line);
        self.minute += 1;
        self
    }

    /// Add a raw line (continuation, garbage, blank)
    pub fn line(mut self, text: &str) -> Self {
        self.lines.push(text.to_string());
        self
    }

    /// Add `count` two-line messages cycling through three senders
    pub fn bulk(mut self, count: usize) -> Self {
        for i in 0..count {
            self = self.message(&format!("User{}", i % 3), &format!("message {}", i));
            self = self.line(&format!("continuation {}", i));
        }
        self
    }

    pub fn build(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

impl Default for TranscriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
