use tracing::{debug, info};

use crate::dataset::DatasetStore;
use crate::matching::MatchEngine;
use crate::models::{InventoryRecord, LookupError, QuickViewRow, TableView};

/// Matched records for one query
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub normalized_query: String,
    pub records: Vec<InventoryRecord>,
}

impl LookupOutcome {
    pub fn quick_view(&self) -> Vec<QuickViewRow> {
        self.records.iter().map(InventoryRecord::quick_view).collect()
    }

    pub fn table(&self) -> TableView {
        TableView::from_records(&self.records)
    }

    pub fn summary(&self) -> String {
        format!("{} record(s) found.", self.records.len())
    }
}

/// Runs lookups against the current dataset snapshot
#[derive(Debug, Clone)]
pub struct LookupService {
    store: DatasetStore,
    engine: MatchEngine,
}

impl LookupService {
    pub fn new(store: DatasetStore, engine: MatchEngine) -> Self {
        Self { store, engine }
    }

    /// Look up a raw scan or typed identifier.
    ///
    /// A query that matches nothing is reported as [`LookupError::NotFound`].
    pub async fn lookup(&self, raw: &str) -> Result<LookupOutcome, LookupError> {
        let dataset = self.store.snapshot().await;
        let (normalized_query, matches) = self.engine.search(&dataset, raw)?;

        debug!(
            raw = %raw,
            normalized = %normalized_query,
            policy = %self.engine.policy(),
            dataset_size = dataset.len(),
            "🔍 Lookup"
        );

        if matches.is_empty() {
            info!(query = %normalized_query, "No record found");
            return Err(LookupError::NotFound {
                query: normalized_query,
            });
        }

        Ok(LookupOutcome {
            normalized_query,
            records: matches.into_iter().cloned().collect(),
        })
    }
}
