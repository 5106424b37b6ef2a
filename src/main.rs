use anyhow::{anyhow, Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use chrono_tz::Tz;
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod config;
mod constants;
mod dataset;
mod handlers;
mod matching;
mod middleware;
mod models;
mod services;
mod utils;

use config::{AppConfig, LogFormat};
use dataset::DatasetStore;
use handlers::{dataset as dataset_handlers, lookup};
use matching::MatchEngine;
use services::LookupService;

#[derive(Clone)]
pub struct AppState {
    pub lookup: LookupService,
    pub store: DatasetStore,
    pub timezone: Tz,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl AppState {
    pub fn new(store: DatasetStore, engine: MatchEngine, timezone: Tz) -> Self {
        Self {
            lookup: LookupService::new(store.clone(), engine),
            store,
            timezone,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub message: String,
    pub records_loaded: usize,
    pub timestamp: String,
    pub version: String,
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check endpoint; degraded while the dataset is empty
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let records_loaded = state.store.record_count().await;
    let (status, message) = if records_loaded > 0 {
        ("healthy", "GTIN lookup backend is running")
    } else {
        ("degraded", "GTIN lookup backend is running without inventory data")
    };

    Json(HealthResponse {
        success: true,
        status: status.to_string(),
        message: message.to_string(),
        records_loaded,
        timestamp: utils::now_rfc3339(state.timezone),
        version: VERSION.to_string(),
    })
}

/// Configure CORS; wildcard origins are refused in production
fn build_cors(cors_origins: &str, production: bool) -> Result<CorsLayer> {
    let methods = [Method::GET, Method::POST];
    let headers = [header::CONTENT_TYPE];

    if cors_origins.trim() == "*" {
        if production {
            return Err(anyhow!(
                "CORS wildcard (*) is not allowed in production. Set CORS_ORIGINS to specific origins."
            ));
        }
        warn!("⚠️ CORS is configured with wildcard (*) - this is only acceptable for development!");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers));
    }

    let origins: Vec<HeaderValue> = cors_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        return Err(anyhow!("No valid CORS origins found in CORS_ORIGINS: {cors_origins}"));
    }

    info!("🔒 CORS configured for specific origins: {}", cors_origins);
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers))
}

/// Assemble API routes, static page serving and response layers
fn build_router(state: AppState, config: &AppConfig) -> Result<Router> {
    let cors = build_cors(&config.cors_origins, config.production)?;
    let reload_limiter = middleware::per_minute_limiter(config.reload_rate_limit_per_minute);

    let mut app = Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/lookup", lookup::create_lookup_routes())
        .nest(
            "/api/dataset",
            dataset_handlers::create_dataset_routes(reload_limiter),
        );

    if let Some(static_path) = &config.static_assets_path {
        info!("📁 Static assets will be served from: {}", static_path.display());
        let index = ServeFile::new(static_path.join("index.html"));
        app = app.fallback_service(ServeDir::new(static_path).fallback(index));
    }

    Ok(app
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        ))
        .with_state(state))
}

fn init_tracing(format: LogFormat) {
    let default_filter = if cfg!(debug_assertions) {
        "gtin_lookup=info,tower_http=warn"
    } else {
        "gtin_lookup=warn,tower_http=error"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Tracing is configured from AppConfig, so config errors go to stderr
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    info!("🚀 Starting GTIN Lookup Backend v{}", VERSION);
    info!(
        "Server configured to run on {} with match policy '{}'",
        config.bind_address(),
        config.match_policy
    );

    let store = DatasetStore::new(config.dataset_source.clone(), config.load_options);
    if let Err(e) = store.reload().await {
        warn!("⚠️  Starting with an empty dataset: {}", e);
        warn!("    Lookups will report no records until POST /api/dataset/reload succeeds");
    }

    let state = AppState::new(store, MatchEngine::new(config.match_policy), config.timezone);
    let app = build_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address()))?;

    info!("🎯 GTIN Lookup Server started successfully on http://{}", config.bind_address());
    info!("🔧 API endpoints available at http://{}/api/", config.bind_address());

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server failed")?;

    Ok(())
}
