//! Documentation datasets.
//!
//! Every dataset supplies the same capability set: a downloader that scrapes
//! its source into documents, a cache key scoping its stored index, a field
//! schema, and a display mapper turning a search hit into an [`Item`].
//! The router and the index lifecycle are written once against [`Dataset`].

pub mod boto3;
pub mod cdk_python;
pub mod fetch;
pub mod html;
pub mod registry;
pub mod tf;

pub use registry::{DatasetRegistry, RegistryEntry};

use crate::index::{CacheKey, Document, Schema};
use crate::item::Item;
use anyhow::Result;
use std::time::Duration;

pub(crate) const DAY: u64 = 24 * 3600;

/// Options for one download run
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadContext {
    /// Ignore cached pages and checkouts, fetch everything again
    pub refresh: bool,
    /// Do not draw spinners (the TUI owns the terminal)
    pub silent: bool,
}

pub trait Dataset: Send + Sync {
    /// Short identifier typed by the user, e.g. `boto3`
    fn id(&self) -> &'static str;

    /// One-line description shown in the dataset menu
    fn description(&self) -> &'static str;

    fn cache_key(&self) -> CacheKey {
        CacheKey::for_dataset(self.id())
    }

    fn schema(&self) -> &Schema;

    /// How long a built index stays fresh
    fn expire(&self) -> Duration;

    /// Scrape the documentation source and extract index documents
    fn download(&self, ctx: &DownloadContext) -> Result<Vec<Document>>;

    /// Map a stored search hit to a display row. Pure; no I/O.
    fn to_item(&self, doc: &Document) -> Item;
}
