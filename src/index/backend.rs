use crate::index::schema::Schema;
use crate::index::types::{CacheKey, Document, IndexState};
use anyhow::Result;
use std::time::Duration;

/// Produces the documents of a full (re)build. Runs once per build.
pub type Downloader<'a> = dyn FnMut() -> Result<Vec<Document>> + 'a;

/// The indexed search engine the query controller talks to.
///
/// Implementations own index state durably, keyed by cache key. A build
/// either replaces the previous generation completely or leaves it
/// untouched; a search never observes a half-built generation.
pub trait SearchBackend: Send + Sync {
    fn index_state(&self, key: &CacheKey) -> IndexState;

    fn has_index(&self, key: &CacheKey) -> bool {
        self.index_state(key) == IndexState::Fresh
    }

    /// Blocking full build; errors from the downloader are returned as-is
    fn build_index(
        &self,
        key: &CacheKey,
        schema: &Schema,
        expire: Duration,
        download: &mut Downloader<'_>,
    ) -> Result<()>;

    /// Ranked search returning stored fields of the top `limit` documents
    fn search(&self, key: &CacheKey, schema: &Schema, query: &str, limit: usize) -> Result<Vec<Document>>;

    fn remove_index(&self, key: &CacheKey) -> Result<()>;
}
