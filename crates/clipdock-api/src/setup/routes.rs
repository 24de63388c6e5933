use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_auth;
use crate::handlers;
use crate::state::AppState;

/// Headroom above the application caps so the transport-level limit only
/// stops grossly oversized bodies; size validation inside the pipeline
/// answers first with a 400.
const BODY_LIMIT_SLACK_BYTES: u64 = 4 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new().route("/healthz", get(handlers::health::healthz));

    let protected_routes = Router::new()
        .route("/api/videos", post(handlers::videos::create_video))
        .route(
            "/api/videos/{video_id}/video",
            post(handlers::video_upload::upload_video),
        )
        .route(
            "/api/videos/{video_id}/thumbnail",
            post(handlers::thumbnail_upload::upload_thumbnail),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let body_limit = state
        .config
        .max_video_size_bytes
        .max(state.config.max_thumbnail_size_bytes)
        + BODY_LIMIT_SLACK_BYTES;

    let concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    public_routes
        .merge(protected_routes)
        .layer(ConcurrencyLimitLayer::new(concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit as usize))
        .layer(DefaultBodyLimit::disable())
        .layer(setup_cors(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn setup_cors(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        tracing::warn!("CORS configured to allow all origins, not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    }
}
