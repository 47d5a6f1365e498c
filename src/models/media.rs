use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const LOCATOR_SCHEME: &str = "media://";

// Characters escaped in the basename segment of a locator
const LOCATOR_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b':')
    .add(b'@')
    .add(b'[')
    .add(b']')
    .add(b'!');

/// Opaque reference to a media blob resolved during one session.
///
/// Rendered as `media://<session>/<index>/<percent-encoded basename>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(session: Uuid, index: usize, basename: &str) -> Self {
        let encoded = utf8_percent_encode(basename, LOCATOR_ENCODE_SET);
        Self(format!("{}{}/{}/{}", LOCATOR_SCHEME, session, index, encoded))
    }

    /// Wrap an already-rendered locator string (e.g. one read back from a cache)
    pub fn from_raw(raw: &str) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded basename segment, if the locator is well-formed
    pub fn basename(&self) -> Option<String> {
        let rest = self.0.strip_prefix(LOCATOR_SCHEME)?;
        let encoded = rest.rsplit('/').next()?;
        if encoded.is_empty() {
            return None;
        }
        Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attachment basename → locator lookup.
///
/// Every basename is registered verbatim and lowercased so transcript references
/// resolve regardless of casing.
#[derive(Debug, Clone, Default)]
pub struct MediaTable {
    entries: HashMap<String, Locator>,
}

impl MediaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a basename; an existing registration for the same key is kept
    pub fn register(&mut self, basename: &str, locator: Locator) {
        self.entries.entry(basename.to_lowercase()).or_insert_with(|| locator.clone());
        self.entries.entry(basename.to_string()).or_insert(locator);
    }

    /// Exact lookup first, then the lowercased form
    pub fn lookup(&self, name: &str) -> Option<&Locator> {
        self.entries.get(name).or_else(|| self.entries.get(&name.to_lowercase()))
    }

    /// Map a locator from an earlier session onto this table by its basename
    pub fn rebind(&self, locator: &Locator) -> Option<Locator> {
        locator.basename().and_then(|name| self.lookup(&name).cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Media bytes materialized for the lifetime of a session
#[derive(Debug, Default)]
pub struct MediaStore {
    session: Uuid,
    blobs: HashMap<Locator, Arc<[u8]>>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self { session: Uuid::new_v4(), blobs: HashMap::new() }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Store a blob and hand back its locator
    pub fn insert(&mut self, basename: &str, bytes: Vec<u8>) -> Locator {
        let locator = Locator::new(self.session, self.blobs.len(), basename);
        self.blobs.insert(locator.clone(), Arc::from(bytes));
        locator
    }

    pub fn get(&self, locator: &Locator) -> Option<Arc<[u8]>> {
        self.blobs.get(locator).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_round_trips_basename_with_spaces() {
        let locator = Locator::new(Uuid::nil(), 3, "My Photo #1.jpg");
        assert!(locator.as_str().starts_with("media://00000000-0000-0000-0000-000000000000/3/"));
        assert!(!locator.as_str().contains(' '));
        assert_eq!(locator.basename().as_deref(), Some("My Photo #1.jpg"));
    }

    #[test]
    fn test_locator_basename_rejects_foreign_strings() {
        assert_eq!(Locator::from_raw("file:///tmp/a.jpg").basename(), None);
        assert_eq!(Locator::from_raw("media://s/0/").basename(), None);
    }

    #[test]
    fn test_table_lookup_is_case_insensitive() {
        let mut table = MediaTable::new();
        let locator = Locator::new(Uuid::nil(), 0, "IMG_001.JPG");
        table.register("IMG_001.JPG", locator.clone());

        assert_eq!(table.lookup("IMG_001.JPG"), Some(&locator));
        assert_eq!(table.lookup("img_001.jpg"), Some(&locator));
        assert_eq!(table.lookup("Img_001.Jpg"), Some(&locator));
        assert_eq!(table.lookup("IMG_002.JPG"), None);
    }

    #[test]
    fn test_table_first_registration_wins() {
        let mut table = MediaTable::new();
        let first = Locator::new(Uuid::nil(), 0, "a.jpg");
        let second = Locator::new(Uuid::nil(), 1, "a.jpg");
        table.register("a.jpg", first.clone());
        table.register("a.jpg", second);
        assert_eq!(table.lookup("a.jpg"), Some(&first));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_rebind_uses_basename() {
        let old = Locator::new(Uuid::nil(), 7, "voice.opus");
        let mut store = MediaStore::new();
        let fresh = store.insert("voice.opus", vec![1, 2, 3]);
        let mut table = MediaTable::new();
        table.register("voice.opus", fresh.clone());

        assert_eq!(table.rebind(&old), Some(fresh.clone()));
        assert_eq!(store.get(&fresh).as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(table.rebind(&Locator::new(Uuid::nil(), 0, "gone.jpg")), None);
    }
}
