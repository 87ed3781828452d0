use crate::dataset::DatasetRegistry;
use crate::item::Item;

/// Added when the filter is a substring of the dataset id (or the reverse),
/// so typing a fragment beats a merely similar-looking id
const CONTAINS_BONUS: f64 = 0.5;

/// Similarity of `filter` to a dataset id, higher is closer
pub fn score(filter: &str, id: &str) -> f64 {
    let filter = filter.to_lowercase();
    let id = id.to_lowercase();

    let mut score = strsim::jaro_winkler(&filter, &id);
    if !filter.is_empty() && (id.contains(&filter) || filter.contains(&id)) {
        score += CONTAINS_BONUS;
    }
    score
}

/// Dataset rows for the selection menu. Every dataset is always listed;
/// a non-empty filter only reorders them, ties keeping registry order.
pub fn select_datasets(registry: &DatasetRegistry, filter: &str) -> Vec<Item> {
    let filter = filter.trim();
    let mut entries: Vec<_> = registry.entries().iter().collect();

    if !filter.is_empty() {
        let mut scored: Vec<_> = entries.into_iter().map(|e| (score(filter, e.id()), e)).collect();
        // sort_by is stable
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        entries = scored.into_iter().map(|(_, e)| e).collect();
    }

    entries
        .into_iter()
        .map(|e| Item::dataset(e.id(), e.dataset.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SearchBackend;
    use crate::testing::{FakeDataset, MemoryBackend};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn registry(ids: &[&'static str]) -> DatasetRegistry {
        let backend: Arc<dyn SearchBackend> = Arc::new(MemoryBackend::default());
        let mut registry = DatasetRegistry::new();
        for &id in ids {
            registry.register(Arc::new(FakeDataset::new(id)), Arc::clone(&backend));
        }
        registry
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().filter_map(|i| i.arg.as_deref()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_registry_order() {
        let registry = registry(&["boto3", "cdk_python", "tf"]);
        assert_eq!(ids(&select_datasets(&registry, "")), vec!["boto3", "cdk_python", "tf"]);
        assert_eq!(ids(&select_datasets(&registry, "   ")), vec!["boto3", "cdk_python", "tf"]);
    }

    #[test]
    fn test_filter_reorders_but_keeps_everything() {
        let registry = registry(&["boto3", "cdk_python", "tf"]);

        let items = select_datasets(&registry, "cdk");
        assert_eq!(ids(&items)[0], "cdk_python");
        assert_eq!(items.len(), 3);

        let items = select_datasets(&registry, "TF");
        assert_eq!(ids(&items)[0], "tf");
    }

    #[test]
    fn test_ties_keep_registry_order() {
        let registry = registry(&["alpha", "beta"]);
        // Nothing in common with either id
        let items = select_datasets(&registry, "zz");
        assert_eq!(ids(&items), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_items_prime_in_dataset_search() {
        let registry = registry(&["alpha"]);
        let item = &select_datasets(&registry, "")[0];
        assert_eq!(item.autocomplete.as_deref(), Some("alpha "));
    }

    #[test]
    fn test_score_prefers_containment() {
        assert!(score("bot", "boto3") > score("bot", "tf"));
        assert!(score("python", "cdk_python") > score("python", "boto3"));
    }
}
