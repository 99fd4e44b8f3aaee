//! Catalog endpoints: listing, search, per-file info, recently modified.

use crate::auth::{CallerIdentity, Permission};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use docshelf_core::models::{FileInfoResponse, ListResponse, SearchResponse, StorageArea};
use docshelf_core::AppError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    area: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    days: Option<u32>,
}

fn parse_area(area: Option<&str>) -> Result<StorageArea, AppError> {
    match area.unwrap_or("active") {
        "active" => Ok(StorageArea::Active),
        "backup" => Ok(StorageArea::Backup),
        other => Err(AppError::BadRequest(format!(
            "Invalid area: {}. Must be 'active' or 'backup'",
            other
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/api/v0/files",
    tag = "files",
    params(
        ("area" = Option<String>, Query, description = "Area to list: 'active' (default) or 'backup'")
    ),
    responses(
        (status = 200, description = "File listing", body = ListResponse),
        (status = 400, description = "Invalid area", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, HttpAppError> {
    identity.require(Permission::Read)?;
    let area = parse_area(query.area.as_deref())?;
    let listing = state.catalog.list(area).await?;
    Ok(Json(listing))
}

#[utoipa::path(
    get,
    path = "/api/v0/files/search",
    tag = "files",
    params(
        ("q" = String, Query, description = "Case-insensitive substring to match against file names")
    ),
    responses(
        (status = 200, description = "Matching files", body = SearchResponse),
        (status = 400, description = "Missing query", body = ErrorResponse)
    )
)]
pub async fn search_files(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, HttpAppError> {
    identity.require(Permission::Read)?;
    let q = query
        .q
        .ok_or_else(|| AppError::BadRequest("Query parameter 'q' is required".to_string()))?;
    let results = state.catalog.search(&q).await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/v0/files/recent",
    tag = "files",
    params(
        ("days" = Option<u32>, Query, description = "Look-back window in days (default 3)")
    ),
    responses(
        (status = 200, description = "Recently modified files", body = ListResponse)
    )
)]
pub async fn recent_files(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ListResponse>, HttpAppError> {
    identity.require(Permission::Read)?;
    let days = match query.days {
        Some(days) if days >= 1 => days,
        _ => 3,
    };
    let listing = state.catalog.recent(days).await?;
    Ok(Json(listing))
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileInfoResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn file_info(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(name): Path<String>,
) -> Result<Json<FileInfoResponse>, HttpAppError> {
    identity.require(Permission::Read)?;
    let info = state.catalog.info(&name).await?;
    Ok(Json(info))
}
