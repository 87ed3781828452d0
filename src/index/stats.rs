use crate::dataset::DatasetRegistry;
use crate::index::store::IndexStore;
use crate::index::types::{IndexState, unix_now};
use serde::Serialize;

/// Index status of one registered dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    pub id: &'static str,
    pub description: &'static str,
    #[serde(serialize_with = "serialize_state")]
    pub state: IndexState,
    pub doc_count: Option<u32>,
    pub age_secs: Option<u64>,
    pub size_bytes: Option<u64>,
}

fn serialize_state<S: serde::Serializer>(state: &IndexState, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(state_label(*state))
}

pub fn state_label(state: IndexState) -> &'static str {
    match state {
        IndexState::Absent => "absent",
        IndexState::Stale => "stale",
        IndexState::Fresh => "fresh",
    }
}

/// Status of every dataset, in registry order
pub fn collect_status(registry: &DatasetRegistry, store: &IndexStore) -> Vec<DatasetStatus> {
    let now = unix_now();

    registry
        .entries()
        .iter()
        .map(|entry| {
            let info = store.info(&entry.dataset.cache_key());
            DatasetStatus {
                id: entry.id(),
                description: entry.dataset.description(),
                state: info.as_ref().map_or(IndexState::Absent, |i| i.meta.state_at(now)),
                doc_count: info.as_ref().map(|i| i.meta.doc_count),
                age_secs: info.as_ref().map(|i| i.meta.age_secs(now)),
                size_bytes: info.as_ref().map(|i| i.size_bytes),
            }
        })
        .collect()
}

/// Print the dataset table
pub fn list_datasets(registry: &DatasetRegistry, store: &IndexStore) {
    let statuses = collect_status(registry, store);

    println!("{:<12} {:<8} {:>8} {:>10} {:>10}  DESCRIPTION", "DATASET", "INDEX", "DOCS", "AGE", "SIZE");
    for status in &statuses {
        println!(
            "{:<12} {:<8} {:>8} {:>10} {:>10}  {}",
            status.id,
            state_label(status.state),
            status.doc_count.map_or("-".to_string(), |n| n.to_string()),
            status.age_secs.map_or("-".to_string(), format_age),
            status.size_bytes.map_or("-".to_string(), format_size),
            status.description,
        );
    }

    println!();
    println!("Index location: {}", store.root().display());
}

/// Format an age in seconds to the largest whole unit
pub fn format_age(secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = MINUTE * 60;
    const DAY: u64 = HOUR * 24;

    if secs >= DAY {
        format!("{}d", secs / DAY)
    } else if secs >= HOUR {
        format!("{}h", secs / HOUR)
    } else if secs >= MINUTE {
        format!("{}m", secs / MINUTE)
    } else {
        format!("{}s", secs)
    }
}

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
