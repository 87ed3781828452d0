//! In-memory collaborators for unit tests.

use crate::dataset::{Dataset, DownloadContext};
use crate::index::{CacheKey, Document, Downloader, Field, IndexState, Schema, SearchBackend};
use crate::item::Item;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Dataset whose "documentation" is a fixed list of names
pub struct FakeDataset {
    id: &'static str,
    names: Vec<&'static str>,
    schema: Schema,
}

impl FakeDataset {
    pub fn new(id: &'static str) -> Self {
        Self::with_names(id, vec!["foo_one", "foo_two", "bucket", "bar"])
    }

    pub fn with_names(id: &'static str, names: Vec<&'static str>) -> Self {
        Self {
            id,
            names,
            schema: Schema::new(vec![Field::text("name"), Field::stored("url")]),
        }
    }
}

impl Dataset for FakeDataset {
    fn id(&self) -> &'static str {
        self.id
    }

    fn description(&self) -> &'static str {
        "Fake docs"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn expire(&self) -> Duration {
        Duration::from_secs(3600)
    }

    fn download(&self, _ctx: &DownloadContext) -> Result<Vec<Document>> {
        Ok(self
            .names
            .iter()
            .map(|name| {
                Document::new()
                    .with("name", *name)
                    .with("url", format!("https://docs.example/{}/{}", self.id, name))
            })
            .collect())
    }

    fn to_item(&self, doc: &Document) -> Item {
        let name = doc.field("name");
        Item::reference(
            format!("{}:{}", self.id, name),
            name,
            doc.field("url"),
            doc.field("url"),
            name,
        )
    }
}

/// Backend keeping documents in memory and recording every call
#[derive(Default)]
pub struct MemoryBackend {
    indexes: Mutex<HashMap<CacheKey, Vec<Document>>>,
    stale: Mutex<HashSet<CacheKey>>,
    builds: Mutex<Vec<CacheKey>>,
    searches: Mutex<Vec<(CacheKey, String)>>,
    fail_builds: AtomicBool,
    fail_searches: AtomicBool,
}

impl MemoryBackend {
    pub fn insert(&self, key: CacheKey, docs: Vec<Document>) {
        self.indexes.lock().unwrap().insert(key, docs);
    }

    pub fn mark_stale(&self, key: CacheKey) {
        self.stale.lock().unwrap().insert(key);
    }

    pub fn fail_builds(&self, fail: bool) {
        self.fail_builds.store(fail, Ordering::SeqCst);
    }

    pub fn fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, Ordering::SeqCst);
    }

    pub fn builds(&self) -> Vec<CacheKey> {
        self.builds.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<(CacheKey, String)> {
        self.searches.lock().unwrap().clone()
    }
}

impl SearchBackend for MemoryBackend {
    fn index_state(&self, key: &CacheKey) -> IndexState {
        if !self.indexes.lock().unwrap().contains_key(key) {
            IndexState::Absent
        } else if self.stale.lock().unwrap().contains(key) {
            IndexState::Stale
        } else {
            IndexState::Fresh
        }
    }

    fn build_index(
        &self,
        key: &CacheKey,
        _schema: &Schema,
        _expire: Duration,
        download: &mut Downloader<'_>,
    ) -> Result<()> {
        self.builds.lock().unwrap().push(key.clone());
        if self.fail_builds.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        let docs = download()?;
        self.indexes.lock().unwrap().insert(key.clone(), docs);
        self.stale.lock().unwrap().remove(key);
        Ok(())
    }

    fn search(&self, key: &CacheKey, _schema: &Schema, query: &str, limit: usize) -> Result<Vec<Document>> {
        self.searches.lock().unwrap().push((key.clone(), query.to_string()));
        if self.fail_searches.load(Ordering::SeqCst) {
            anyhow::bail!("index is corrupt");
        }
        let indexes = self.indexes.lock().unwrap();
        let Some(docs) = indexes.get(key) else {
            anyhow::bail!("no index for {key}");
        };
        Ok(docs
            .iter()
            .filter(|d| query == "*" || d.field("name").contains(query))
            .take(limit)
            .cloned()
            .collect())
    }

    fn remove_index(&self, key: &CacheKey) -> Result<()> {
        self.indexes.lock().unwrap().remove(key);
        Ok(())
    }
}
