use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::inventory::{InventoryRecord, QuickViewRow, TableView};

/// Errors returned by a barcode / material lookup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Query is {length} characters long, maximum is {max}")]
    QueryTooLong { length: usize, max: usize },

    #[error("No record found for '{query}'")]
    NotFound { query: String },
}

/// Query-string parameters of `GET /api/lookup`
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    #[serde(alias = "query")]
    pub q: Option<String>,
}

/// Body of `POST /api/lookup`
#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub query: String,
}

/// Successful lookup: full matches plus the derived views
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub success: bool,
    pub query: String,
    pub normalized_query: String,
    pub count: usize,
    pub message: String,
    pub records: Vec<InventoryRecord>,
    pub table: TableView,
    pub quick_view: Vec<QuickViewRow>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuickViewResponse {
    pub success: bool,
    pub normalized_query: String,
    pub count: usize,
    pub quick_view: Vec<QuickViewRow>,
}
