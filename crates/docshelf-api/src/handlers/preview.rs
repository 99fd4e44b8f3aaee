use crate::auth::{CallerIdentity, Permission};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use docshelf_core::sanitize_filename;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    page: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{name}/preview",
    tag = "files",
    params(
        ("name" = String, Path, description = "File name"),
        ("page" = Option<u32>, Query, description = "1-indexed page number (default 1)")
    ),
    responses(
        (status = 200, description = "Preview image", content_type = "image/png"),
        (status = 400, description = "Invalid or out-of-range page", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 415, description = "Preview not supported for this file", body = ErrorResponse),
        (status = 504, description = "Preview generation timed out", body = ErrorResponse)
    )
)]
pub async fn preview_file(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(name): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response, HttpAppError> {
    identity.require(Permission::Read)?;
    let name = sanitize_filename(&name)?;
    let page = query.page.unwrap_or(1);

    let preview = state.previews.preview(&name, page).await?;

    Ok((
        [(header::CONTENT_TYPE, preview.content_type)],
        preview.bytes,
    )
        .into_response())
}
