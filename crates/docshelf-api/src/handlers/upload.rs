use crate::auth::{CallerIdentity, Permission};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use docshelf_core::models::{StorageArea, UploadResponse, UploadedFile};
use docshelf_core::AppError;
use docshelf_processing::{classify, CLASSIFY_WINDOW};
use futures::TryStreamExt;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v0/files",
    tag = "files",
    responses(
        (status = 200, description = "Files uploaded", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    identity.require(Permission::Write)?;

    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let raw_name = match field.file_name() {
            Some(name) => name.to_string(),
            // Non-file form fields carry no payload for us.
            None => continue,
        };

        let reader = tokio_util::io::StreamReader::new(Box::pin(
            field.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        ));

        let stored = state.lifecycle.upload(&raw_name, reader).await?;

        let kind = state
            .store
            .read_prefix(&stored.name, StorageArea::Active, CLASSIFY_WINDOW)
            .await
            .map(|prefix| classify(&prefix))
            .unwrap_or(docshelf_core::models::FileKind::Other);

        tracing::info!(
            name = %stored.name,
            size_bytes = stored.size_bytes,
            kind = %kind,
            uploaded_by = %identity.subject,
            "File uploaded"
        );

        uploaded.push(UploadedFile {
            name: stored.name,
            size_bytes: stored.size_bytes,
            kind,
        });
    }

    if uploaded.is_empty() {
        return Err(AppError::BadRequest("No files in request".to_string()).into());
    }

    let total_size_bytes = uploaded.iter().map(|f| f.size_bytes).sum();
    Ok(Json(UploadResponse {
        total: uploaded.len(),
        total_size_bytes,
        files: uploaded,
    }))
}
