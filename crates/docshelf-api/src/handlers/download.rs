use crate::auth::{CallerIdentity, Permission};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use docshelf_core::sanitize_filename;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/v0/files/{name}/download",
    tag = "files",
    params(
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "Raw file bytes", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(name): Path<String>,
) -> Result<Response, HttpAppError> {
    identity.require(Permission::Read)?;
    let name = sanitize_filename(&name)?;

    let stream = state.store.stream(&name).await?;
    let body = Body::from_stream(stream);

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        )
        .body(body)
        .map_err(|e| docshelf_core::AppError::Internal(e.to_string()))?;

    Ok(response)
}
