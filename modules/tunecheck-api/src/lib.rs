pub mod error;
pub mod limits;
pub mod rest;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use tunecheck_common::Config;
use tunecheck_scout::Analyzer;

pub use error::ApiError;
pub use limits::{RateLimiter, ReportCache};

pub struct AppState {
    pub analyzer: Analyzer,
    pub cache: ReportCache,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(analyzer: Analyzer, config: &Config) -> Self {
        Self {
            analyzer,
            cache: ReportCache::new(config.cache_ttl),
            rate_limiter: RateLimiter::new(config.rate_limit_per_hour),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/api/analyze",
            get(rest::analyze_get).post(rest::analyze_post),
        )
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Reports reflect live upstream data
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only (no query params, no IP)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
