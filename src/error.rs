use crate::item::Item;

/// Failures the query controller reports to the UI.
///
/// A failed build and a failed search are kept apart from "zero matches",
/// which is a successful, empty result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown dataset {0:?}")]
    UnknownDataset(String),

    #[error("could not build index for {dataset}: {cause:#}")]
    IndexBuild { dataset: String, cause: anyhow::Error },

    #[error("search failed in {dataset}: {cause:#}")]
    SearchExecution { dataset: String, cause: anyhow::Error },
}

impl Error {
    pub fn index_build(dataset: &str, cause: anyhow::Error) -> Self {
        Self::IndexBuild {
            dataset: dataset.to_string(),
            cause,
        }
    }

    pub fn search_execution(dataset: &str, cause: anyhow::Error) -> Self {
        Self::SearchExecution {
            dataset: dataset.to_string(),
            cause,
        }
    }

    /// Render the error as a single row for the item list
    pub fn to_item(&self) -> Item {
        match self {
            Self::UnknownDataset(id) => Item::error(
                format!("{id}-unknown"),
                format!("Unknown dataset {id:?}"),
                "Clear the query to pick a dataset",
            ),
            Self::IndexBuild { dataset, cause } => Item::error(
                format!("{dataset}-build-failed"),
                format!("Could not build the {dataset} index"),
                format!("{cause:#} (type any key to retry)"),
            ),
            Self::SearchExecution { dataset, cause } => Item::error(
                format!("{dataset}-search-failed"),
                format!("Search failed in {dataset}"),
                format!("{cause:#}"),
            ),
        }
    }
}
