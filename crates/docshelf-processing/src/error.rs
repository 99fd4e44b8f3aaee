//! Preview pipeline errors.

use docshelf_core::models::FileKind;
use docshelf_core::AppError;
use docshelf_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Preview not supported for {kind} files")]
    Unsupported { kind: FileKind },

    #[error("Page {page} out of range: document has {page_count} pages")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    #[error("Preview generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Rasterization failed: {0}")]
    RenderFailed(String),

    #[error("Office conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Image processing error: {0}")]
    Image(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<PreviewError> for AppError {
    fn from(err: PreviewError) -> Self {
        match err {
            PreviewError::Unsupported { kind } => AppError::PreviewUnsupported(format!(
                "Preview not supported for {} files",
                kind
            )),
            PreviewError::PageOutOfRange { page, page_count } => {
                AppError::PageOutOfRange { page, page_count }
            }
            PreviewError::InvalidPage(msg) => AppError::InvalidPage(msg),
            PreviewError::Timeout { seconds } => AppError::PreviewTimeout { seconds },
            PreviewError::RenderFailed(msg) => {
                AppError::Internal(format!("Rasterization failed: {}", msg))
            }
            PreviewError::ConversionFailed(msg) => {
                AppError::Internal(format!("Office conversion failed: {}", msg))
            }
            PreviewError::Image(msg) => {
                AppError::Internal(format!("Image processing error: {}", msg))
            }
            PreviewError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_core::ErrorMetadata;

    #[test]
    fn test_unsupported_maps_to_415() {
        let app: AppError = PreviewError::Unsupported {
            kind: FileKind::Other,
        }
        .into();
        assert_eq!(app.http_status_code(), 415);
    }

    #[test]
    fn test_page_out_of_range_maps_to_400() {
        let app: AppError = PreviewError::PageOutOfRange {
            page: 9,
            page_count: 2,
        }
        .into();
        assert_eq!(app.http_status_code(), 400);
        assert_eq!(app.error_code(), "PAGE_OUT_OF_RANGE");
    }

    #[test]
    fn test_timeout_maps_to_504() {
        let app: AppError = PreviewError::Timeout { seconds: 30 }.into();
        assert_eq!(app.http_status_code(), 504);
    }

    #[test]
    fn test_storage_not_found_passes_through() {
        let app: AppError = PreviewError::Storage(StorageError::NotFound("x".into())).into();
        assert_eq!(app.http_status_code(), 404);
    }
}
