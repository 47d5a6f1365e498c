//! Cache keys and metadata

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cache schema version for invalidation on format changes
pub const CACHE_VERSION: u32 = 1;

/// Identity of one parsed export: its name plus transcript size in bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub name: String,
    pub size: u64,
}

impl CacheKey {
    pub fn from_source(name: &str, size: u64) -> Self {
        Self { name: name.to_string(), size }
    }

    /// Directory name isolating this key's files: first 12 hex chars of its hash
    pub fn digest(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        format!("{:016x}", hasher.finish())[..12].to_string()
    }
}

/// Stored next to the serialized records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub version: u32,
    pub key: CacheKey,
    pub record_count: usize,
    pub created_at: DateTime<Utc>,
}

impl CacheMetadata {
    pub fn new(key: &CacheKey, record_count: usize) -> Self {
        Self { version: CACHE_VERSION, key: key.clone(), record_count, created_at: Utc::now() }
    }

    /// True when these files were written for `key` by this cache version
    pub fn matches(&self, key: &CacheKey) -> bool {
        self.version == CACHE_VERSION && self.key == *key
    }
}
