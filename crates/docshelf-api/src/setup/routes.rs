//! Route configuration and setup.

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers;
use crate::setup::health;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use docshelf_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Multipart overhead allowed on top of the file size ceiling before the
/// transport-level body limit kicks in.
const BODY_LIMIT_SLACK_BYTES: u64 = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        service_api_key: config.service_api_key.clone(),
        jwt_secret: config.jwt_secret.clone(),
        jwks: state.jwks.clone(),
    });

    let public_routes = public_routes(state.clone());
    let protected_routes = file_routes(state.clone()).layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let app = public_routes
        .merge(protected_routes)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            (config.max_file_size_bytes + BODY_LIMIT_SLACK_BYTES) as usize,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::openapi_spec()) }),
        )
        .with_state(state)
}

fn file_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v0/files", post(handlers::upload::upload_files))
        .route("/api/v0/files", get(handlers::files::list_files))
        .route("/api/v0/files/search", get(handlers::files::search_files))
        .route("/api/v0/files/recent", get(handlers::files::recent_files))
        .route("/api/v0/files/{name}", get(handlers::files::file_info))
        .route(
            "/api/v0/files/{name}",
            delete(handlers::lifecycle::delete_file),
        )
        .route(
            "/api/v0/files/{name}/download",
            get(handlers::download::download_file),
        )
        .route(
            "/api/v0/files/{name}/preview",
            get(handlers::preview::preview_file),
        )
        .route(
            "/api/v0/files/{name}/restore",
            post(handlers::lifecycle::restore_file),
        )
        .route(
            "/api/v0/files/{name}/purge",
            delete(handlers::lifecycle::purge_file),
        )
        .with_state(state)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
