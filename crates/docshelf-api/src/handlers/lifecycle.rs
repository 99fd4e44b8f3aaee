//! Lifecycle mutation endpoints: soft delete, restore, permanent purge.

use crate::auth::{CallerIdentity, Permission};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use docshelf_core::models::FileActionResponse;
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/v0/files/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "File moved to backup", body = FileActionResponse),
        (status = 404, description = "File not found in active area", body = ErrorResponse),
        (status = 409, description = "Backup already holds this name", body = ErrorResponse)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(name): Path<String>,
) -> Result<Json<FileActionResponse>, HttpAppError> {
    identity.require(Permission::Delete)?;
    let name = state.lifecycle.soft_delete(&name).await?;

    tracing::info!(name = %name, deleted_by = %identity.subject, "File soft-deleted");
    Ok(Json(FileActionResponse {
        name,
        action: "soft_deleted".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v0/files/{name}/restore",
    tag = "files",
    params(
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "File restored to active area", body = FileActionResponse),
        (status = 404, description = "File not found in backup area", body = ErrorResponse),
        (status = 409, description = "Active area already holds this name", body = ErrorResponse)
    )
)]
pub async fn restore_file(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(name): Path<String>,
) -> Result<Json<FileActionResponse>, HttpAppError> {
    identity.require(Permission::Write)?;
    let name = state.lifecycle.restore(&name).await?;

    tracing::info!(name = %name, restored_by = %identity.subject, "File restored");
    Ok(Json(FileActionResponse {
        name,
        action: "restored".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v0/files/{name}/purge",
    tag = "files",
    params(
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "File permanently removed from backup", body = FileActionResponse),
        (status = 404, description = "File not found in backup area", body = ErrorResponse)
    )
)]
pub async fn purge_file(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(name): Path<String>,
) -> Result<Json<FileActionResponse>, HttpAppError> {
    identity.require(Permission::Delete)?;
    let name = state.lifecycle.purge(&name).await?;

    tracing::info!(name = %name, purged_by = %identity.subject, "File purged");
    Ok(Json(FileActionResponse {
        name,
        action: "purged".to_string(),
    }))
}
