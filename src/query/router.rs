use crate::dataset::DatasetRegistry;
use crate::error::Error;
use crate::item::Item;
use crate::query::lifecycle::{IndexLifecycle, PendingSearch, Response};
use crate::query::parser::{MATCH_ALL, Query};
use crate::query::selection::select_datasets;
use tracing::trace;

/// Entry point for every keystroke: decides between picking a dataset
/// and searching inside one
pub struct Router {
    registry: DatasetRegistry,
    lifecycle: IndexLifecycle,
}

impl Router {
    pub fn new(registry: DatasetRegistry, limit: usize) -> Self {
        Self {
            registry,
            lifecycle: IndexLifecycle::new(limit),
        }
    }

    /// Hide download spinners during builds
    pub fn silent(mut self, silent: bool) -> Self {
        self.lifecycle = self.lifecycle.silent(silent);
        self
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn lifecycle(&self) -> &IndexLifecycle {
        &self.lifecycle
    }

    /// Route one raw input line.
    ///
    /// In-dataset search needs the first token to be an exact dataset id and a
    /// separator after it; anything else is a filter over the dataset menu.
    pub fn route(&self, raw: &str) -> Result<Response, Error> {
        let query = Query::parse(raw);

        if query.has_separator_after_first()
            && let Some(entry) = query.first().and_then(|id| self.registry.get(id))
        {
            let rest = query.rest();
            let sub_query = if rest.is_empty() { MATCH_ALL } else { rest.as_str() };
            trace!(dataset = entry.id(), sub_query, "in-dataset search");
            return self.lifecycle.begin(entry, sub_query);
        }

        let filter = query.filter();
        trace!(filter = %filter, "dataset selection");
        Ok(Response::Items(select_datasets(&self.registry, &filter)))
    }

    /// Second phase of a pending response: build the index, then search it
    pub fn resume(&self, pending: PendingSearch) -> Result<Vec<Item>, Error> {
        let entry = self
            .registry
            .get(&pending.dataset)
            .ok_or_else(|| Error::UnknownDataset(pending.dataset.clone()))?;
        self.lifecycle.finish(entry, pending)
    }

    /// Both phases back to back, for callers that do not draw placeholders
    pub fn route_blocking(&self, raw: &str) -> Result<Vec<Item>, Error> {
        match self.route(raw)? {
            Response::Items(items) => Ok(items),
            Response::Pending(pending) => self.resume(pending),
        }
    }
}
