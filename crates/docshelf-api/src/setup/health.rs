//! Health check handlers.
//!
//! Liveness is unconditional; readiness reflects the storage root and, when
//! an identity provider is configured, JWKS reachability.

use crate::state::AppState;
use axum::extract::State;
use axum::{http::StatusCode, response::IntoResponse, Json};
use docshelf_core::models::StorageArea;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Run an async check with timeout; returns "ready", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "ready".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - storage areas and identity provider.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let mut response = serde_json::json!({
        "status": "ready",
        "storage": "unknown",
    });
    let mut overall_ready = true;

    let resolver = state.store.resolver().clone();
    let storage_status = run_check(
        TIMEOUT,
        async move {
            for area in [StorageArea::Active, StorageArea::Backup, StorageArea::Preview] {
                tokio::fs::metadata(resolver.area_root(area)).await?;
            }
            Ok::<(), std::io::Error>(())
        },
        "not_ready",
    )
    .await;
    if storage_status != "ready" {
        tracing::error!(status = %storage_status, "Storage readiness check failed");
        overall_ready = false;
    }
    response["storage"] = serde_json::json!(storage_status);

    match state.jwks {
        Some(ref jwks) => {
            let jwks = jwks.clone();
            let idp_status = run_check(
                TIMEOUT,
                async move { jwks.health_check().await },
                "not_ready",
            )
            .await;
            if idp_status != "ready" {
                tracing::error!(status = %idp_status, "Identity provider readiness check failed");
                overall_ready = false;
            }
            response["identity_provider"] = serde_json::json!(idp_status);
        }
        None => {
            // Shared-secret validation needs no remote dependency.
            response["identity_provider"] = serde_json::json!("not_configured");
        }
    }

    if !overall_ready {
        response["status"] = serde_json::json!("not_ready");
    }

    let status_code = if overall_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
