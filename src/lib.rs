use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod errors;
pub mod handlers;
pub mod kv;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use config::Config;
use handlers::AppState;
use kv::{KvStore, MemoryStore, RedisStore};
use utils::SystemClock;

/// Connects to Redis when `REDIS_URL` is configured and falls back to the in-memory store
/// otherwise.
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let store: Arc<dyn KvStore> = match config.redis_url.as_deref() {
        Some(url) => {
            tracing::info!("Using Redis key-value store");
            Arc::new(RedisStore::new(url).await?)
        }
        None => {
            tracing::warn!("REDIS_URL not set, keeping state in memory");
            Arc::new(MemoryStore::new())
        }
    };

    AppState::new(store, Arc::new(SystemClock), config)
}

pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/rate-limit", get(handlers::rate_limit::get_rate_limit))
        .route(
            "/gallery",
            get(handlers::gallery::get_gallery)
                .post(handlers::gallery::save_to_gallery)
                .delete(handlers::gallery::delete_from_gallery),
        )
        .route(
            "/fabrics",
            get(handlers::fabrics::list_fabrics).post(handlers::fabrics::create_fabric),
        )
        .route(
            "/fabrics/reconcile",
            post(handlers::fabrics::reconcile_indexes),
        )
        .route(
            "/fabrics/:id",
            get(handlers::fabrics::get_fabric)
                .put(handlers::fabrics::update_fabric)
                .delete(handlers::fabrics::delete_fabric),
        )
        .route("/fabrics/:id/toggle", post(handlers::fabrics::toggle_fabric));

    Router::new()
        .route("/health", get(handlers::health::liveness))
        .route("/ready", get(handlers::health::readiness))
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
