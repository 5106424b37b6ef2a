use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::models::InventoryRecord;

pub mod loader;

pub use loader::{DatasetError, DatasetSource, LoadOptions};

/// Current in-memory dataset and the outcome of the last load
#[derive(Debug, Default)]
struct DatasetState {
    records: Arc<Vec<InventoryRecord>>,
    loaded_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Shared handle to the inventory dataset.
///
/// Queries take an immutable snapshot; a reload replaces the snapshot
/// wholesale, so in-flight lookups finish against the data they started on.
#[derive(Clone)]
pub struct DatasetStore {
    state: Arc<RwLock<DatasetState>>,
    source: DatasetSource,
    options: LoadOptions,
}

impl std::fmt::Debug for DatasetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetStore")
            .field("source", &self.source)
            .field("options", &self.options)
            .finish()
    }
}

impl DatasetStore {
    /// Create an empty store; call [`DatasetStore::reload`] to populate it
    pub fn new(source: DatasetSource, options: LoadOptions) -> Self {
        Self {
            state: Arc::new(RwLock::new(DatasetState::default())),
            source,
            options,
        }
    }

    /// Store pre-populated with records, as if a load had just succeeded
    #[cfg(test)]
    pub fn from_records(records: Vec<InventoryRecord>) -> Self {
        let state = DatasetState {
            records: Arc::new(records),
            loaded_at: Some(Utc::now()),
            last_error: None,
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            source: DatasetSource::File("in-memory".into()),
            options: LoadOptions {
                timeout: std::time::Duration::from_secs(1),
                retries: 0,
            },
        }
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    /// Immutable view of the records queries run against
    pub async fn snapshot(&self) -> Arc<Vec<InventoryRecord>> {
        self.state.read().await.records.clone()
    }

    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Load the dataset from its source and swap it in.
    ///
    /// On failure the dataset falls back to empty and the error is kept
    /// for status reporting; lookups then report not-found rather than fail.
    pub async fn reload(&self) -> Result<usize, DatasetError> {
        let result = loader::load_dataset(&self.source, self.options).await;

        let mut state = self.state.write().await;
        match result {
            Ok(records) => {
                let count = records.len();
                state.records = Arc::new(records);
                state.loaded_at = Some(Utc::now());
                state.last_error = None;
                info!(source = %self.source, records = count, "📦 Dataset snapshot replaced");
                Ok(count)
            }
            Err(e) => {
                error!(source = %self.source, error = %e, "❌ Failed to load dataset");
                state.records = Arc::new(Vec::new());
                state.loaded_at = None;
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Dataset status for monitoring, timestamps rendered in `tz`
    pub async fn status(&self, tz: Tz) -> DatasetStatus {
        let state = self.state.read().await;
        DatasetStatus {
            loaded: state.loaded_at.is_some(),
            record_count: state.records.len(),
            source: self.source.to_string(),
            loaded_at: state
                .loaded_at
                .map(|at| at.with_timezone(&tz).to_rfc3339()),
            last_error: state.last_error.clone(),
        }
    }
}

/// Dataset status for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    pub loaded: bool,
    pub record_count: usize,
    pub source: String,
    pub loaded_at: Option<String>,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn store_for(path: &std::path::Path) -> DatasetStore {
        DatasetStore::new(
            DatasetSource::File(path.to_path_buf()),
            LoadOptions {
                timeout: Duration::from_secs(5),
                retries: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_reload_populates_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"MATERIAL_ID":"1"}},{{"MATERIAL_ID":"2"}}]"#).unwrap();

        let store = store_for(file.path());
        assert_eq!(store.record_count().await, 0);
        assert_eq!(store.reload().await.unwrap(), 2);
        assert_eq!(store.snapshot().await.len(), 2);

        let status = store.status(chrono_tz::UTC).await;
        assert!(status.loaded);
        assert_eq!(status.record_count, 2);
        assert!(status.last_error.is_none());
    }

    #[tokio::test]
    async fn test_failed_reload_falls_back_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"MATERIAL_ID":"1"}}]"#).unwrap();
        let store = store_for(file.path());
        store.reload().await.unwrap();

        std::fs::write(file.path(), r#"{"not":"an array"}"#).unwrap();

        let err = store.reload().await.unwrap_err();
        assert!(matches!(err, DatasetError::NotAnArray(_)));
        assert_eq!(store.record_count().await, 0);

        let status = store.status(chrono_tz::UTC).await;
        assert!(!status.loaded);
        assert!(status.last_error.unwrap().contains("JSON array"));
    }

    #[tokio::test]
    async fn test_snapshot_survives_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"MATERIAL_ID":"1"}}]"#).unwrap();
        let store = store_for(file.path());
        store.reload().await.unwrap();

        let before = store.snapshot().await;
        std::fs::write(file.path(), r#"[]"#).unwrap();
        store.reload().await.unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(store.record_count().await, 0);
    }
}
