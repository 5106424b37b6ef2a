use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;

use crate::constants::{MSG_EMPTY_QUERY, MSG_NOT_FOUND};
use crate::models::{LookupError, LookupParams, LookupRequest, LookupResponse, QuickViewResponse};
use crate::services::LookupOutcome;
use crate::utils::now_rfc3339;
use crate::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Create lookup routes
pub fn create_lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(lookup_by_query).post(lookup_by_body))
        .route("/quick", get(quick_view))
}

fn handle_lookup_error(error: LookupError, raw: &str) -> ApiError {
    let message = error.to_string();
    match error {
        LookupError::EmptyQuery => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Empty query",
                "message": MSG_EMPTY_QUERY
            })),
        ),
        LookupError::QueryTooLong { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Validation error",
                "message": message
            })),
        ),
        LookupError::NotFound { query } => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Not found",
                "message": MSG_NOT_FOUND,
                "query": raw,
                "normalized_query": query
            })),
        ),
    }
}

fn lookup_response(state: &AppState, raw: String, outcome: LookupOutcome) -> LookupResponse {
    LookupResponse {
        success: true,
        count: outcome.records.len(),
        message: outcome.summary(),
        table: outcome.table(),
        quick_view: outcome.quick_view(),
        normalized_query: outcome.normalized_query,
        records: outcome.records,
        query: raw,
        timestamp: now_rfc3339(state.timezone),
    }
}

async fn run_lookup(state: &AppState, raw: String) -> Result<Json<LookupResponse>, ApiError> {
    match state.lookup.lookup(&raw).await {
        Ok(outcome) => Ok(Json(lookup_response(state, raw, outcome))),
        Err(e) => Err(handle_lookup_error(e, &raw)),
    }
}

/// Look up a scanned or typed identifier
/// GET /api/lookup?q={raw}
async fn lookup_by_query(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<LookupResponse>, ApiError> {
    run_lookup(&state, params.q.unwrap_or_default()).await
}

/// Look up an identifier submitted as JSON
/// POST /api/lookup
async fn lookup_by_body(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
    run_lookup(&state, request.query).await
}

/// Storage locations only
/// GET /api/lookup/quick?q={raw}
async fn quick_view(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<QuickViewResponse>, ApiError> {
    let raw = params.q.unwrap_or_default();
    match state.lookup.lookup(&raw).await {
        Ok(outcome) => Ok(Json(QuickViewResponse {
            success: true,
            count: outcome.records.len(),
            quick_view: outcome.quick_view(),
            normalized_query: outcome.normalized_query,
        })),
        Err(e) => Err(handle_lookup_error(e, &raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_SEARCH_QUERY_LENGTH;
    use crate::dataset::DatasetStore;
    use crate::matching::{MatchEngine, NormalizationPolicy};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let records = vec![
            json!({
                "MATERIAL_ID": "500",
                "MATERIAL_DESCRIPTION": "Fish sauce 700ml",
                "ZONE": "A",
                "STORAGE_BIN": "A-01-01",
                "BATCH": "B2401",
                "VENDOR_NAME": "Siam Foods",
                "BARCODE_NUMBER": "01234567890128"
            }),
            json!({ "MATERIAL_ID": "500", "ZONE": "D", "STORAGE_BIN": "D-11-04" }),
            json!({ "MATERIAL_ID": "0042", "ZONE": "B", "STORAGE_BIN": "B-07-02" }),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();

        let state = AppState::new(
            DatasetStore::from_records(records),
            MatchEngine::new(NormalizationPolicy::Gs1Aware),
            chrono_tz::UTC,
        );
        Router::new()
            .nest("/api/lookup", create_lookup_routes())
            .with_state(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_returns_records_table_and_quick_view() {
        let (status, body) = send(get("/api/lookup?q=500")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["message"], "2 record(s) found.");
        assert_eq!(body["records"][0]["VENDOR_NAME"], "Siam Foods");
        assert_eq!(body["table"]["columns"][1], "MATERIAL_DESCRIPTION");
        assert_eq!(body["table"]["rows"][1][3], "D-11-04");
        assert_eq!(
            body["quick_view"][1],
            json!({ "MATERIAL_ID": "500", "ZONE": "D", "STORAGE_BIN": "D-11-04" })
        );
    }

    #[tokio::test]
    async fn test_gs1_scan_matches_padded_barcode() {
        let (status, body) = send(get("/api/lookup?q=010123456789012899991231")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["normalized_query"], "1234567890128");
        assert_eq!(body["count"], 1);
        assert_eq!(body["records"][0]["STORAGE_BIN"], "A-01-01");
    }

    #[tokio::test]
    async fn test_post_lookup() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/lookup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"query":"42"}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quick_view"][0]["STORAGE_BIN"], "B-07-02");
    }

    #[tokio::test]
    async fn test_quick_view_route() {
        let (status, body) = send(get("/api/lookup/quick?q=0500")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert!(body.get("records").is_none());
    }

    #[tokio::test]
    async fn test_missing_and_blank_query_are_bad_requests() {
        for uri in ["/api/lookup", "/api/lookup?q=%20%20"] {
            let (status, body) = send(get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], MSG_EMPTY_QUERY);
        }
    }

    #[tokio::test]
    async fn test_overlong_query_reports_length() {
        let raw = "1".repeat(MAX_SEARCH_QUERY_LENGTH + 5);
        let (status, body) = send(get(&format!("/api/lookup?q={raw}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation error");
        assert_eq!(
            body["message"],
            LookupError::QueryTooLong {
                length: MAX_SEARCH_QUERY_LENGTH + 5,
                max: MAX_SEARCH_QUERY_LENGTH,
            }
            .to_string()
        );
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_not_found() {
        let (status, body) = send(get("/api/lookup?q=999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], MSG_NOT_FOUND);
        assert_eq!(body["query"], "999");
    }
}
