use reqwest::header::CACHE_CONTROL;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::InventoryRecord;

/// Where the dataset document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// `http://` and `https://` values are fetched, anything else is a path
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Timeout and retry policy for a single load
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub timeout: Duration,
    pub retries: u32,
}

/// Dataset load failures
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch dataset: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Dataset request returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Dataset load timed out after {0:?}")]
    Timeout(Duration),

    #[error("Dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Dataset must be a JSON array of records, found {0}")]
    NotAnArray(&'static str),
}

impl DatasetError {
    /// Transport failures are worth another attempt, malformed data is not
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Fetch(_) | Self::HttpStatus(_) | Self::Timeout(_)
        )
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a dataset document. The top-level value must be an array of objects.
pub fn parse_dataset(bytes: &[u8]) -> Result<Vec<InventoryRecord>, DatasetError> {
    let document: Value = serde_json::from_slice(bytes)?;
    if !document.is_array() {
        return Err(DatasetError::NotAnArray(json_type_name(&document)));
    }
    Ok(serde_json::from_value(document)?)
}

async fn fetch_bytes(source: &DatasetSource) -> Result<Vec<u8>, DatasetError> {
    match source {
        DatasetSource::File(path) => Ok(tokio::fs::read(path).await?),
        DatasetSource::Url(url) => {
            let response = reqwest::Client::new()
                .get(url)
                .header(CACHE_CONTROL, "no-cache")
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(DatasetError::HttpStatus(status.as_u16()));
            }
            Ok(response.bytes().await?.to_vec())
        }
    }
}

/// Load the dataset, retrying transport failures up to `options.retries` times
pub async fn load_dataset(
    source: &DatasetSource,
    options: LoadOptions,
) -> Result<Vec<InventoryRecord>, DatasetError> {
    let attempts = options.retries + 1;
    let mut attempt = 1;

    loop {
        debug!(%source, attempt, "Loading dataset");

        let result = match tokio::time::timeout(options.timeout, fetch_bytes(source)).await {
            Ok(fetched) => fetched.and_then(|bytes| parse_dataset(&bytes)),
            Err(_) => Err(DatasetError::Timeout(options.timeout)),
        };

        match result {
            Ok(records) => {
                info!(%source, records = records.len(), "✅ Dataset loaded");
                return Ok(records);
            }
            Err(e) if e.is_transient() && attempt < attempts => {
                warn!(%source, attempt, error = %e, "⚠️ Dataset load failed, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
