use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Position of a document inside one index generation
pub type DocId = u32;

/// Current on-disk format version
pub const INDEX_VERSION: u32 = 1;

/// Identifier scoping stored data and refreshes to exactly one dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Cache key used by a dataset: `findref-<id>`
    pub fn for_dataset(id: &str) -> Self {
        Self(format!("findref-{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A flat mapping of field name to value, as extracted from a record
/// and as returned (stored fields only) by a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, String>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Field value, or an empty string when the field is missing
    pub fn field(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Lifecycle state of one dataset's index, as observed by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Never built (or removed)
    Absent,
    /// Built, but older than the dataset's expiry
    Stale,
    /// Built and within its expiry
    Fresh,
}

/// Index metadata stored as `meta.json` in every generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub cache_key: CacheKey,
    pub doc_count: u32,
    /// Unix timestamp of the build
    pub built_at: u64,
    /// Seconds after `built_at` when the index turns stale; 0 = never
    pub expire_secs: u64,
    /// Field names in schema order
    pub fields: Vec<String>,
}

impl IndexMeta {
    /// Age of the index in seconds
    pub fn age_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.built_at)
    }

    pub fn state_at(&self, now: u64) -> IndexState {
        if self.version != INDEX_VERSION {
            return IndexState::Stale;
        }
        if self.expire_secs > 0 && self.age_secs(now) >= self.expire_secs {
            IndexState::Stale
        } else {
            IndexState::Fresh
        }
    }
}

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(built_at: u64, expire_secs: u64) -> IndexMeta {
        IndexMeta {
            version: INDEX_VERSION,
            cache_key: CacheKey::for_dataset("tf"),
            doc_count: 3,
            built_at,
            expire_secs,
            fields: vec!["item".into()],
        }
    }

    #[test]
    fn test_cache_key_for_dataset() {
        assert_eq!(CacheKey::for_dataset("boto3").as_str(), "findref-boto3");
    }

    #[test]
    fn test_state_expiry() {
        assert_eq!(meta(1_000, 100).state_at(1_050), IndexState::Fresh);
        assert_eq!(meta(1_000, 100).state_at(1_100), IndexState::Stale);
        assert_eq!(meta(1_000, 0).state_at(u64::MAX), IndexState::Fresh);
    }

    #[test]
    fn test_old_version_is_stale() {
        let mut m = meta(1_000, 0);
        m.version = INDEX_VERSION + 1;
        assert_eq!(m.state_at(1_000), IndexState::Stale);
    }

    #[test]
    fn test_document_field_defaults_to_empty() {
        let doc = Document::new().with("url", "https://example.com");
        assert_eq!(doc.field("url"), "https://example.com");
        assert_eq!(doc.field("missing"), "");
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_document_json_is_flat() {
        let doc: Document = [("a", "1"), ("b", "2")].into_iter().collect();
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"a":"1","b":"2"}"#);
    }
}
