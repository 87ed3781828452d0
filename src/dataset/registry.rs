use crate::dataset::boto3::{self, Boto3};
use crate::dataset::cdk_python::{self, CdkPython};
use crate::dataset::tf::{self, Terraform};
use crate::dataset::{Dataset, fetch::HttpCache};
use crate::index::{IndexStore, SearchBackend};
use crate::utils::{AppConfig, get_dataset_dir};
use anyhow::Result;
use std::sync::Arc;

/// A dataset together with the backend holding its index
#[derive(Clone)]
pub struct RegistryEntry {
    pub dataset: Arc<dyn Dataset>,
    pub backend: Arc<dyn SearchBackend>,
}

impl RegistryEntry {
    pub fn id(&self) -> &'static str {
        self.dataset.id()
    }
}

/// Ordered, closed set of datasets, built once at startup
#[derive(Clone, Default)]
pub struct DatasetRegistry {
    entries: Vec<RegistryEntry>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dataset. Ids are unique; a repeated id replaces the earlier entry in place.
    pub fn register(&mut self, dataset: Arc<dyn Dataset>, backend: Arc<dyn SearchBackend>) {
        let entry = RegistryEntry { dataset, backend };
        match self.entries.iter_mut().find(|e| e.id() == entry.id()) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// The shipped datasets, all sharing the on-disk index store
    pub fn builtin(config: &AppConfig) -> Result<Self> {
        let backend: Arc<dyn SearchBackend> = Arc::new(IndexStore::open_default()?);
        let threads = config.effective_fetch_threads();

        let boto3_cache = HttpCache::new(get_dataset_dir(boto3::ID)?.join("http"), config)?;
        let cdk_cache = HttpCache::new(get_dataset_dir(cdk_python::ID)?.join("http"), config)?;
        let tf_dir = get_dataset_dir(tf::ID)?;

        let mut registry = Self::new();
        registry.register(Arc::new(Boto3::new(boto3_cache, threads)), Arc::clone(&backend));
        registry.register(Arc::new(CdkPython::new(cdk_cache, threads)), Arc::clone(&backend));
        registry.register(Arc::new(Terraform::new(tf_dir.join("git_repos"), threads)), backend);
        Ok(registry)
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(RegistryEntry::id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
