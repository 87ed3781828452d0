use crate::index::backend::{Downloader, SearchBackend};
use crate::index::reader::{IndexReader, read_meta};
use crate::index::schema::Schema;
use crate::index::types::*;
use crate::index::writer::IndexWriter;
use crate::query::SearchQuery;
use crate::utils::{dir_size, get_indexes_dir, sanitize};
use anyhow::{Context, Result};
use lru::LruCache;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Loaded readers kept warm between keystrokes
const READER_CACHE_SIZE: usize = 4;

/// On-disk index store: one directory per cache key
pub struct IndexStore {
    root: PathBuf,
    readers: Mutex<LruCache<CacheKey, Arc<IndexReader>>>,
}

/// Summary of one stored index, for listings
#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub meta: IndexMeta,
    pub dir: PathBuf,
    pub size_bytes: u64,
}

impl IndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create index root {}", root.display()))?;

        Ok(Self {
            root,
            readers: Mutex::new(LruCache::new(
                NonZeroUsize::new(READER_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            )),
        })
    }

    /// Store under the app data directory
    pub fn open_default() -> Result<Self> {
        Self::new(get_indexes_dir()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the live generation for a key
    pub fn index_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(sanitize(key.as_str()))
    }

    pub fn info(&self, key: &CacheKey) -> Option<IndexInfo> {
        let dir = self.index_dir(key);
        let meta = read_meta(&dir).ok()?;
        let size_bytes = dir_size(&dir).unwrap_or(0);
        Some(IndexInfo {
            meta,
            dir,
            size_bytes,
        })
    }

    /// Get a loaded reader, opening the live generation on a cache miss
    fn reader(&self, key: &CacheKey) -> Result<Arc<IndexReader>> {
        if let Some(reader) = self.lock_readers().get(key) {
            return Ok(Arc::clone(reader));
        }

        let dir = self.index_dir(key);
        let reader = Arc::new(
            IndexReader::open(&dir)
                .with_context(|| format!("No usable index for {key}"))?,
        );
        debug!(%key, docs = reader.doc_count(), "loaded index");

        self.lock_readers().put(key.clone(), Arc::clone(&reader));
        Ok(reader)
    }

    fn lock_readers(&self) -> std::sync::MutexGuard<'_, LruCache<CacheKey, Arc<IndexReader>>> {
        // A poisoned cache only holds immutable readers, so keep using it
        self.readers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn scratch_dir(&self, key: &CacheKey, label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        self.root.join(format!(
            ".{}.{}-{}-{}",
            sanitize(key.as_str()),
            label,
            std::process::id(),
            nanos
        ))
    }

    /// Replace the live generation with `staging` using renames only
    fn swap_in(&self, key: &CacheKey, staging: &Path) -> Result<()> {
        let live = self.index_dir(key);
        let retired = self.scratch_dir(key, "old");

        let had_live = live.exists();
        if had_live {
            fs::rename(&live, &retired)
                .with_context(|| format!("Failed to retire {}", live.display()))?;
        }

        if let Err(e) = fs::rename(staging, &live) {
            // Put the previous generation back
            if had_live && let Err(restore) = fs::rename(&retired, &live) {
                warn!(
                    %key,
                    error = %restore,
                    retired = %retired.display(),
                    "could not restore previous index generation"
                );
            }
            return Err(e).with_context(|| format!("Failed to activate {}", live.display()));
        }

        self.lock_readers().pop(key);

        if had_live && let Err(e) = fs::remove_dir_all(&retired) {
            warn!(%key, error = %e, "could not remove retired index generation");
        }

        Ok(())
    }
}

impl SearchBackend for IndexStore {
    fn index_state(&self, key: &CacheKey) -> IndexState {
        match read_meta(&self.index_dir(key)) {
            Ok(meta) => meta.state_at(unix_now()),
            Err(_) => IndexState::Absent,
        }
    }

    fn build_index(
        &self,
        key: &CacheKey,
        schema: &Schema,
        expire: Duration,
        download: &mut Downloader<'_>,
    ) -> Result<()> {
        let documents = download()?;

        let mut writer = IndexWriter::new(key.clone(), schema, expire);
        for doc in &documents {
            writer.add_document(doc);
        }

        let staging = self.scratch_dir(key, "staging");
        let written = writer.write(&staging).and_then(|meta| {
            self.swap_in(key, &staging)?;
            Ok(meta)
        });

        match written {
            Ok(meta) => {
                info!(%key, docs = meta.doc_count, "index generation activated");
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_dir_all(&staging);
                Err(e)
            }
        }
    }

    fn search(&self, key: &CacheKey, schema: &Schema, query: &str, limit: usize) -> Result<Vec<Document>> {
        let reader = self.reader(key)?;
        Ok(reader.search(schema, &SearchQuery::parse(query), limit))
    }

    fn remove_index(&self, key: &CacheKey) -> Result<()> {
        self.lock_readers().pop(key);
        let dir = self.index_dir(key);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::schema::Field;

    fn schema() -> Schema {
        Schema::new(vec![Field::text("name"), Field::stored("url")])
    }

    fn docs(names: &[&str]) -> Vec<Document> {
        names
            .iter()
            .map(|n| Document::new().with("name", *n).with("url", format!("https://x/{n}")))
            .collect()
    }

    fn build(store: &IndexStore, key: &CacheKey, names: &[&str]) -> Result<()> {
        let batch = docs(names);
        let mut download = || -> Result<Vec<Document>> { Ok(batch.clone()) };
        store.build_index(key, &schema(), Duration::ZERO, &mut download)
    }

    #[test]
    fn test_failed_activation_restores_previous_generation() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path()).unwrap();
        let key = CacheKey::new("findref-test");
        build(&store, &key, &["get_object"]).unwrap();

        let missing = tmp.path().join("no-such-staging");
        assert!(store.swap_in(&key, &missing).is_err());

        assert_eq!(store.index_state(&key), IndexState::Fresh);
        assert_eq!(store.search(&key, &schema(), "object", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_absent_then_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path()).unwrap();
        let key = CacheKey::new("findref-test");

        assert_eq!(store.index_state(&key), IndexState::Absent);
        assert!(!store.has_index(&key));

        build(&store, &key, &["get_object"]).unwrap();
        assert_eq!(store.index_state(&key), IndexState::Fresh);

        let results = store.search(&key, &schema(), "object", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].field("url"), "https://x/get_object");
    }

    #[test]
    fn test_rebuild_replaces_generation() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path()).unwrap();
        let key = CacheKey::new("findref-test");

        build(&store, &key, &["get_object"]).unwrap();
        // Warm the reader cache so the swap has to invalidate it
        assert_eq!(store.search(&key, &schema(), "*", 10).unwrap().len(), 1);

        build(&store, &key, &["put_object", "delete_object"]).unwrap();
        assert_eq!(store.search(&key, &schema(), "*", 10).unwrap().len(), 2);

        // No staging or retired directories left behind
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failed_build_keeps_previous_generation() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path()).unwrap();
        let key = CacheKey::new("findref-test");

        build(&store, &key, &["get_object"]).unwrap();

        let mut failing = || -> Result<Vec<Document>> { anyhow::bail!("network down") };
        let err = store
            .build_index(&key, &schema(), Duration::ZERO, &mut failing)
            .unwrap_err();
        assert!(err.to_string().contains("network down"));

        assert_eq!(store.index_state(&key), IndexState::Fresh);
        let results = store.search(&key, &schema(), "get", 10).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_builds_are_scoped_by_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path()).unwrap();
        let a = CacheKey::new("findref-a");
        let b = CacheKey::new("findref-b");

        build(&store, &a, &["alpha"]).unwrap();
        build(&store, &b, &["beta"]).unwrap();
        build(&store, &a, &["alpha_two"]).unwrap();

        let results = store.search(&b, &schema(), "*", 10).unwrap();
        assert_eq!(results[0].field("name"), "beta");
    }

    #[test]
    fn test_search_without_index_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path()).unwrap();
        assert!(store.search(&CacheKey::new("nope"), &schema(), "x", 10).is_err());
    }

    #[test]
    fn test_remove_index() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path()).unwrap();
        let key = CacheKey::new("findref-test");

        build(&store, &key, &["get_object"]).unwrap();
        assert!(store.info(&key).is_some());

        store.remove_index(&key).unwrap();
        assert_eq!(store.index_state(&key), IndexState::Absent);
        assert!(store.info(&key).is_none());
    }

    #[test]
    fn test_expired_index_is_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path()).unwrap();
        let key = CacheKey::new("findref-test");

        let mut download = || -> Result<Vec<Document>> { Ok(docs(&["x"])) };
        store
            .build_index(&key, &schema(), Duration::from_secs(1), &mut download)
            .unwrap();

        let meta_path = store.index_dir(&key).join(crate::index::writer::META_FILE);
        let mut meta = read_meta(&store.index_dir(&key)).unwrap();
        meta.built_at = 0;
        fs::write(&meta_path, serde_json::to_string(&meta).unwrap()).unwrap();

        assert_eq!(store.index_state(&key), IndexState::Stale);
    }
}
