//! Record caches: on-disk with atomic writes, and in-memory

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use bincode::config;
use tracing::{debug, warn};

use super::metadata::{CacheKey, CacheMetadata};
use crate::models::MessageRecord;
use crate::utils::get_cache_root;

const METADATA_FILENAME: &str = "metadata.json";
const RECORDS_FILENAME: &str = "records.bin";

/// Storage for fully parsed record sequences
///
/// Only completed parse runs are ever stored. `get` returning `Ok(None)` means "parse again".
pub trait RecordCache {
    fn put(&self, key: &CacheKey, records: &[MessageRecord]) -> Result<()>;
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<MessageRecord>>>;
}

/// Two files per key under `<root>/<digest>/`:
/// - `metadata.json`: version, key, record count, creation time
/// - `records.bin`: bincode-serialized records
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf() }
    }

    /// Cache rooted at [`get_cache_root`]
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(&get_cache_root()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.digest())
    }
}

fn write_atomic(dir: &Path, filename: &str, bytes: &[u8]) -> Result<()> {
    let target = dir.join(filename);
    let temp = dir.join(format!("{}.tmp", filename));
    fs::write(&temp, bytes)
        .with_context(|| format!("Failed to write temp file: {}", temp.display()))?;
    fs::rename(&temp, &target)
        .with_context(|| format!("Failed to rename temp file: {}", temp.display()))?;
    Ok(())
}

impl RecordCache for FileCache {
    fn put(&self, key: &CacheKey, records: &[MessageRecord]) -> Result<()> {
        let dir = self.entry_dir(key);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        let record_bytes = bincode::serde::encode_to_vec(records, config::standard())
            .context("Failed to serialize records")?;
        let metadata_json = serde_json::to_string_pretty(&CacheMetadata::new(key, records.len()))
            .context("Failed to serialize cache metadata")?;

        // Records first: metadata is only present once the records it describes are complete
        write_atomic(&dir, RECORDS_FILENAME, &record_bytes)?;
        write_atomic(&dir, METADATA_FILENAME, metadata_json.as_bytes())?;

        debug!(dir = %dir.display(), records = records.len(), "Stored records in cache");
        Ok(())
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Vec<MessageRecord>>> {
        let dir = self.entry_dir(key);
        let metadata_path = dir.join(METADATA_FILENAME);
        let records_path = dir.join(RECORDS_FILENAME);

        if !metadata_path.exists() || !records_path.exists() {
            return Ok(None);
        }

        let metadata_json =
            fs::read_to_string(&metadata_path).context("Failed to read cache metadata")?;
        let metadata: CacheMetadata = match serde_json::from_str(&metadata_json) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Corrupt cache metadata at {}, reparsing: {}", metadata_path.display(), e);
                return Ok(None);
            }
        };

        if !metadata.matches(key) {
            warn!(
                "Cache entry {} does not match (version {}, key {:?}), reparsing",
                dir.display(),
                metadata.version,
                metadata.key
            );
            return Ok(None);
        }

        let record_bytes = fs::read(&records_path).context("Failed to read cached records")?;
        let records: Vec<MessageRecord> =
            match bincode::serde::decode_from_slice(&record_bytes, config::standard()) {
                Ok((records, _)) => records,
                Err(e) => {
                    warn!("Corrupt cached records at {}, reparsing: {}", records_path.display(), e);
                    return Ok(None);
                }
            };

        if records.len() != metadata.record_count {
            warn!(
                "Cached record count mismatch at {} (expected {}, found {}), reparsing",
                dir.display(),
                metadata.record_count,
                records.len()
            );
            return Ok(None);
        }

        debug!(dir = %dir.display(), records = records.len(), "Loaded records from cache");
        Ok(Some(records))
    }
}

/// Process-local cache, mostly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, Vec<MessageRecord>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordCache for MemoryCache {
    fn put(&self, key: &CacheKey, records: &[MessageRecord]) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("Memory cache lock poisoned"))?;
        entries.insert(key.clone(), records.to_vec());
        Ok(())
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Vec<MessageRecord>>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("Memory cache lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use uuid::Uuid;

    use super::*;
    use crate::cache::metadata::CACHE_VERSION;
    use crate::models::Locator;

    fn sample_records() -> Vec<MessageRecord> {
        let mut first = MessageRecord::new("13/05/2023, 10:00", "Alice", "Hello".to_string());
        first.append_text("second line");
        let mut second = MessageRecord::new("13/05/2023, 10:01", "Bob", String::new());
        second.attach_media(Locator::new(Uuid::nil(), 0, "IMG 001.jpg"));
        second.is_ephemeral = true;
        vec![first, second]
    }

    #[test]
    fn test_file_cache_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let key = CacheKey::from_source("_chat.txt", 42);
        let records = sample_records();

        cache.put(&key, &records).unwrap();
        assert_eq!(cache.get(&key).unwrap(), Some(records));
    }

    #[test]
    fn test_file_cache_miss_for_other_key() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        cache.put(&CacheKey::from_source("_chat.txt", 42), &sample_records()).unwrap();

        assert_eq!(cache.get(&CacheKey::from_source("_chat.txt", 43)).unwrap(), None);
    }

    #[test]
    fn test_file_cache_version_mismatch_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let key = CacheKey::from_source("_chat.txt", 42);
        cache.put(&key, &sample_records()).unwrap();

        let metadata_path = dir.path().join(key.digest()).join(METADATA_FILENAME);
        let json = fs::read_to_string(&metadata_path).unwrap();
        let stale = json.replace(
            &format!("\"version\": {}", CACHE_VERSION),
            &format!("\"version\": {}", CACHE_VERSION + 1),
        );
        fs::write(&metadata_path, stale).unwrap();

        assert_eq!(cache.get(&key).unwrap(), None);
    }

    #[test]
    fn test_file_cache_corrupt_records_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let key = CacheKey::from_source("_chat.txt", 42);
        cache.put(&key, &sample_records()).unwrap();

        fs::write(dir.path().join(key.digest()).join(RECORDS_FILENAME), [0xff; 3]).unwrap();
        assert_eq!(cache.get(&key).unwrap(), None);
    }

    #[test]
    fn test_file_cache_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let key = CacheKey::from_source("_chat.txt", 42);
        cache.put(&key, &sample_records()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path().join(key.digest()))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        let key = CacheKey::from_source("chat", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&key).unwrap(), None);

        cache.put(&key, &sample_records()).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap(), Some(sample_records()));
    }
}
