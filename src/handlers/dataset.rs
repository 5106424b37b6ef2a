use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::dataset::DatasetStatus;
use crate::middleware::{rate_limit_middleware, KeyedLimiter};
use crate::utils::now_rfc3339;
use crate::AppState;

/// Create dataset routes; reloads are rate limited per client IP
pub fn create_dataset_routes(reload_limiter: KeyedLimiter) -> Router<AppState> {
    Router::new()
        .route("/reload", post(reload_dataset))
        .route_layer(from_fn_with_state(reload_limiter, rate_limit_middleware))
        .route("/status", get(dataset_status))
}

/// GET /api/dataset/status
async fn dataset_status(State(state): State<AppState>) -> Json<DatasetStatus> {
    Json(state.store.status(state.timezone).await)
}

/// Re-read the dataset from its source and replace the snapshot
/// POST /api/dataset/reload
async fn reload_dataset(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match state.store.reload().await {
        Ok(count) => Ok(Json(json!({
            "success": true,
            "record_count": count,
            "message": format!("Loaded {count} records."),
            "timestamp": now_rfc3339(state.timezone)
        }))),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "error": "Dataset load failed",
                "message": e.to_string(),
                "source": state.store.source().to_string()
            })),
        )),
    }
}
