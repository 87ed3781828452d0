//! When to search, build, or rebuild a dataset's index.
//!
//! Builds block for seconds, so they are split in two phases: [`IndexLifecycle::begin`]
//! returns a [`PendingSearch`] carrying the placeholder rows to draw right away, and
//! [`IndexLifecycle::finish`] later runs the build and the search. The UI decides
//! how the placeholder reaches the screen in between.

use crate::dataset::{DownloadContext, RegistryEntry};
use crate::error::Error;
use crate::index::{CacheKey, IndexState};
use crate::item::Item;
use crate::query::parser::MATCH_ALL;
use rustc_hash::FxHashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Suffix requesting a rebuild of the current dataset before searching
pub const REFRESH_TOKEN: &str = "!~";

/// Result of routing one query
#[derive(Debug)]
pub enum Response {
    /// Final rows
    Items(Vec<Item>),
    /// Rows to show now, plus a blocking build to run before the final rows exist
    Pending(PendingSearch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// No index yet
    Initial,
    /// The index outlived its expiry
    Expired,
    /// Requested with the refresh suffix
    Refresh,
}

impl BuildKind {
    /// Whether the download should bypass cached pages and checkouts
    pub fn refetch(self) -> bool {
        matches!(self, BuildKind::Expired | BuildKind::Refresh)
    }
}

/// Change the UI must make to its input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEdit {
    /// Remove the refresh suffix
    StripEscape,
}

impl BufferEdit {
    /// Apply the edit to `buffer`. Trailing whitespace is trimmed first and the
    /// suffix is removed by characters, only if the buffer actually ends with it.
    pub fn apply(self, buffer: &str) -> String {
        match self {
            BufferEdit::StripEscape => {
                let trimmed = buffer.trim_end();
                match trimmed.strip_suffix(REFRESH_TOKEN) {
                    Some(rest) => rest.to_string(),
                    None => buffer.to_string(),
                }
            }
        }
    }
}

/// A search waiting on an index build
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSearch {
    pub dataset: String,
    /// Sub-query to run once the build is done, refresh suffix removed
    pub query: String,
    pub kind: BuildKind,
    /// Rows to render while the build runs
    pub placeholder: Vec<Item>,
    pub edit: Option<BufferEdit>,
}

/// Split a trailing refresh suffix off a sub-query
fn strip_refresh(sub_query: &str) -> Option<String> {
    let rest = sub_query.trim().strip_suffix(REFRESH_TOKEN)?.trim_end();
    Some(if rest.is_empty() { MATCH_ALL.to_string() } else { rest.to_string() })
}

#[derive(Debug)]
pub struct IndexLifecycle {
    limit: usize,
    silent: bool,
    /// Expired indexes whose rebuild failed this session; searched as they are
    /// until a refresh is requested
    kept_expired: Mutex<FxHashSet<CacheKey>>,
}

impl IndexLifecycle {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            silent: false,
            kept_expired: Mutex::new(FxHashSet::default()),
        }
    }

    /// Hide download spinners (the TUI owns the terminal)
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// First phase: search right away when the index is fresh, otherwise
    /// hand back the placeholder and the build to run
    pub fn begin(&self, entry: &RegistryEntry, sub_query: &str) -> Result<Response, Error> {
        let dataset = entry.id();
        let key = entry.dataset.cache_key();
        let state = entry.backend.index_state(&key);
        let refresh = strip_refresh(sub_query);

        let (kind, query) = match (state, refresh) {
            (IndexState::Fresh, None) => {
                return self.search(entry, sub_query).map(Response::Items);
            }
            (IndexState::Fresh, Some(query)) => (BuildKind::Refresh, Some(query)),
            (IndexState::Stale, None) if self.lock_kept().contains(&key) => {
                debug!(dataset, "searching expired index kept after a failed rebuild");
                return self.search(entry, sub_query).map(Response::Items);
            }
            (IndexState::Stale, query) => (BuildKind::Expired, query),
            (IndexState::Absent, query) => (BuildKind::Initial, query),
        };

        debug!(dataset, ?state, ?kind, "index build required");
        let edit = query.as_ref().map(|_| BufferEdit::StripEscape);

        Ok(Response::Pending(PendingSearch {
            dataset: dataset.to_string(),
            query: query.unwrap_or_else(|| sub_query.to_string()),
            kind,
            placeholder: vec![Item::building_index(dataset)],
            edit,
        }))
    }

    /// Second phase: build, then search the new generation
    pub fn finish(&self, entry: &RegistryEntry, pending: PendingSearch) -> Result<Vec<Item>, Error> {
        self.build(entry, pending.kind)?;
        self.search(entry, &pending.query)
    }

    /// Blocking download and index build, scoped to this dataset's cache key.
    /// On failure the previous generation, if any, stays in place; a failed
    /// rebuild of an expired index is not retried until a refresh is requested.
    pub fn build(&self, entry: &RegistryEntry, kind: BuildKind) -> Result<(), Error> {
        let dataset = entry.dataset.as_ref();
        let key = dataset.cache_key();
        let ctx = DownloadContext {
            refresh: kind.refetch(),
            silent: self.silent,
        };

        info!(dataset = dataset.id(), key = %key, ?kind, "building index");
        let mut download = || dataset.download(&ctx);
        let built = entry
            .backend
            .build_index(&key, dataset.schema(), dataset.expire(), &mut download);

        match built {
            Ok(()) => {
                self.lock_kept().remove(&key);
                Ok(())
            }
            Err(e) => {
                warn!(dataset = dataset.id(), error = %format!("{e:#}"), "index build failed");
                if kind == BuildKind::Expired {
                    self.lock_kept().insert(key);
                }
                Err(Error::index_build(dataset.id(), e))
            }
        }
    }

    fn lock_kept(&self) -> MutexGuard<'_, FxHashSet<CacheKey>> {
        self.kept_expired.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Search the existing index and map hits to rows
    pub fn search(&self, entry: &RegistryEntry, sub_query: &str) -> Result<Vec<Item>, Error> {
        let dataset = entry.dataset.as_ref();
        let docs = entry
            .backend
            .search(&dataset.cache_key(), dataset.schema(), sub_query, self.limit)
            .map_err(|e| Error::search_execution(dataset.id(), e))?;

        debug!(dataset = dataset.id(), query = sub_query, hits = docs.len(), "searched index");
        Ok(docs
            .iter()
            .map(|doc| {
                let mut item = dataset.to_item(doc);
                item.autocomplete = item
                    .autocomplete
                    .map(|completion| format!("{} {completion}", dataset.id()));
                item
            })
            .collect())
    }
}
