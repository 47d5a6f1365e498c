use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::warn;
use walkdir::WalkDir;

use crate::utils::validate_entry_name;

/// Maximum number of entries read from a directory bundle (guards against walking a huge tree)
const MAX_DIRECTORY_ENTRIES: usize = 100_000;

/// A container of named byte blobs, such as an unpacked export archive.
///
/// Entry names are `/`-separated relative paths. Implementations must be `Sync` so
/// media entries can be read in parallel.
pub trait Bundle: Sync {
    /// Stable identifier of the bundle (e.g. the archive or folder name)
    fn name(&self) -> &str;

    /// Names of all entries, in a stable order
    fn entry_names(&self) -> Vec<String>;

    /// Read an entry's bytes
    fn read_entry(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Size of an entry in bytes, when it can be known without reading it
    fn entry_len(&self, _name: &str) -> io::Result<Option<u64>> {
        Ok(None)
    }

    /// Read at most `max_bytes + 1` bytes of an entry
    ///
    /// A result longer than `max_bytes` means the entry is over the limit.
    fn read_entry_limited(&self, name: &str, _max_bytes: u64) -> io::Result<Vec<u8>> {
        self.read_entry(name)
    }
}

/// Bundle held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    name: String,
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryBundle {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), entries: Vec::new() }
    }

    pub fn with_entry(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.push(name, bytes);
        self
    }

    pub fn push(&mut self, name: &str, bytes: impl Into<Vec<u8>>) {
        self.entries.push((name.to_string(), bytes.into()));
    }
}

impl Bundle for MemoryBundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_entry(&self, name: &str) -> io::Result<Vec<u8>> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry {}", name)))
    }

    fn entry_len(&self, name: &str) -> io::Result<Option<u64>> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, bytes)| Some(bytes.len() as u64))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry {}", name)))
    }
}

/// An export archive that has already been unpacked into a directory
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
    name: String,
    entries: Vec<String>,
}

impl DirectoryBundle {
    /// Walk `root` and index every regular file beneath it
    ///
    /// Symlinks are not followed. Unreadable directory entries are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a directory or holds more than 100,000 files.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("Not a directory: {}", root.display());
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable bundle entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .with_context(|| format!("Entry outside bundle root: {}", entry.path().display()))?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.push(name);

            if entries.len() > MAX_DIRECTORY_ENTRIES {
                bail!(
                    "Too many files in {} (max {}) - is this really a chat export?",
                    root.display(),
                    MAX_DIRECTORY_ENTRIES
                );
            }
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        Ok(Self { root: root.to_path_buf(), name, entries })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, name: &str) -> io::Result<PathBuf> {
        validate_entry_name(name)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        Ok(self.root.join(name))
    }
}

impl Bundle for DirectoryBundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_names(&self) -> Vec<String> {
        self.entries.clone()
    }

    fn read_entry(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.entry_path(name)?)
    }

    fn entry_len(&self, name: &str) -> io::Result<Option<u64>> {
        Ok(Some(fs::metadata(self.entry_path(name)?)?.len()))
    }

    fn read_entry_limited(&self, name: &str, max_bytes: u64) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        File::open(self.entry_path(name)?)?
            .take(max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_memory_bundle_round_trip() {
        let bundle = MemoryBundle::new("export.zip").with_entry("_chat.txt", "hello").with_entry("a.jpg", vec![1, 2]);

        assert_eq!(bundle.name(), "export.zip");
        assert_eq!(bundle.entry_names(), vec!["_chat.txt", "a.jpg"]);
        assert_eq!(bundle.read_entry("a.jpg").unwrap(), vec![1, 2]);
        assert_eq!(bundle.read_entry("missing").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_directory_bundle_indexes_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_chat.txt"), "chat").unwrap();
        fs::create_dir(dir.path().join("media")).unwrap();
        fs::write(dir.path().join("media").join("IMG_1.jpg"), [0xff, 0xd8]).unwrap();

        let bundle = DirectoryBundle::open(dir.path()).unwrap();
        assert_eq!(bundle.entry_names(), vec!["_chat.txt", "media/IMG_1.jpg"]);
        assert_eq!(bundle.read_entry("media/IMG_1.jpg").unwrap(), vec![0xff, 0xd8]);
    }

    #[test]
    fn test_directory_bundle_rejects_traversal_reads() {
        let dir = TempDir::new().unwrap();
        let bundle = DirectoryBundle::open(dir.path()).unwrap();
        let err = bundle.read_entry("../outside.txt").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_directory_bundle_limited_read_stops_past_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_chat.txt"), "0123456789").unwrap();
        let bundle = DirectoryBundle::open(dir.path()).unwrap();

        assert_eq!(bundle.entry_len("_chat.txt").unwrap(), Some(10));
        assert_eq!(bundle.read_entry_limited("_chat.txt", 4).unwrap(), b"01234");
        assert_eq!(bundle.read_entry_limited("_chat.txt", 64).unwrap(), b"0123456789");
        assert!(bundle.entry_len("../_chat.txt").is_err());
    }

    #[test]
    fn test_memory_bundle_reports_entry_len() {
        let bundle = MemoryBundle::new("export.zip").with_entry("_chat.txt", "hello");
        assert_eq!(bundle.entry_len("_chat.txt").unwrap(), Some(5));
        assert!(bundle.entry_len("missing").is_err());
    }

    #[test]
    fn test_directory_bundle_requires_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("_chat.txt");
        fs::write(&file, "x").unwrap();
        assert!(DirectoryBundle::open(&file).is_err());
    }
}
