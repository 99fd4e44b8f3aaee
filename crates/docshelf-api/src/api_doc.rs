//! OpenAPI documentation.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docshelf API",
        version = "0.1.0",
        description = "File-management backend: durable uploads, per-page document previews, soft delete with restore, and filename search."
    ),
    paths(
        crate::handlers::upload::upload_files,
        crate::handlers::files::list_files,
        crate::handlers::files::search_files,
        crate::handlers::files::recent_files,
        crate::handlers::files::file_info,
        crate::handlers::download::download_file,
        crate::handlers::preview::preview_file,
        crate::handlers::lifecycle::delete_file,
        crate::handlers::lifecycle::restore_file,
        crate::handlers::lifecycle::purge_file,
    ),
    components(schemas(
        docshelf_core::models::FileKind,
        docshelf_core::models::StorageArea,
        docshelf_core::models::FileResponse,
        docshelf_core::models::FileInfoResponse,
        docshelf_core::models::ListResponse,
        docshelf_core::models::SearchResponse,
        docshelf_core::models::UploadResponse,
        docshelf_core::models::UploadedFile,
        docshelf_core::models::FileActionResponse,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "files", description = "File lifecycle, preview, and catalog operations")
    )
)]
pub struct ApiDoc;

/// The served OpenAPI spec.
pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
