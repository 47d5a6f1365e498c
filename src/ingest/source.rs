use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::archive::{DirectoryBundle, Transcript};
use crate::archive::resolver::decode_transcript;
use crate::error::LoadError;
use crate::utils::MAX_TRANSCRIPT_BYTES;

/// Where a chat export comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A lone transcript file with no media
    Transcript(PathBuf),
    /// An unpacked export: transcript plus media files
    Directory(PathBuf),
}

impl Source {
    /// Classify `path` as a transcript file or an export directory
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedSource`] if `path` is neither a directory nor a
    /// `.txt` file.
    pub fn detect(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(Self::Directory(path.to_path_buf()));
        }

        let is_txt = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if path.is_file() && is_txt {
            return Ok(Self::Transcript(path.to_path_buf()));
        }

        Err(LoadError::UnsupportedSource { path: path.to_path_buf() }.into())
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Transcript(path) | Self::Directory(path) => path,
        }
    }

    /// Human-readable name used in cache keys and output
    pub fn display_name(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string())
    }

    pub(crate) fn open_directory(&self) -> Result<Option<DirectoryBundle>> {
        match self {
            Self::Directory(path) => Ok(Some(DirectoryBundle::open(path)?)),
            Self::Transcript(_) => Ok(None),
        }
    }
}

/// Read a standalone transcript file, enforcing the size limit before reading
pub fn read_transcript_file(path: &Path) -> Result<Transcript> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path)
        .map_err(|source| LoadError::TranscriptRead { name: name.clone(), source })?;
    let size = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?
        .len();
    if size > MAX_TRANSCRIPT_BYTES {
        return Err(LoadError::TranscriptTooLarge { name, size, max: MAX_TRANSCRIPT_BYTES }.into());
    }

    // The file may grow between the size check and the read
    let mut bytes = Vec::with_capacity(size as usize);
    file.take(MAX_TRANSCRIPT_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|source| LoadError::TranscriptRead { name: name.clone(), source })?;

    decode_transcript(&name, bytes)
}
