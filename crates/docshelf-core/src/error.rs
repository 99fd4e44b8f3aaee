//! Error types module
//!
//! This module provides the core error types used throughout the Docshelf
//! application. All errors are unified under the `AppError` enum, which can
//! represent storage, validation, preview, and authorization failures.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_IO_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    #[error("Page {page} out of range: document has {page_count} pages")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("File too large: {size} bytes exceeds ceiling of {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Preview not supported: {0}")]
    PreviewUnsupported(String),

    #[error("Preview generation timed out after {seconds}s")]
    PreviewTimeout { seconds: u64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    StorageIo(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::StorageIo(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable,
/// suggested_action, sensitive, log_level). Reduces duplication in the
/// ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidName(_) => (
            400,
            "INVALID_NAME",
            false,
            Some("Use a plain file name without path separators"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidPage(_) => (
            400,
            "INVALID_PAGE",
            false,
            Some("Page numbers start at 1"),
            false,
            LogLevel::Debug,
        ),
        AppError::PageOutOfRange { .. } => (
            400,
            "PAGE_OUT_OF_RANGE",
            false,
            Some("Request a page within the document's page count"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the file name exists in the requested area"),
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Resolve the occupied name before retrying"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size below the configured ceiling"),
            false,
            LogLevel::Debug,
        ),
        AppError::PreviewUnsupported(_) => (
            415,
            "PREVIEW_UNSUPPORTED",
            false,
            Some("Previews exist only for PDF, image, and office documents"),
            false,
            LogLevel::Debug,
        ),
        AppError::PreviewTimeout { .. } => (
            504,
            "PREVIEW_TIMEOUT",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check authentication token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            Some("Caller lacks the role required for this operation"),
            false,
            LogLevel::Debug,
        ),
        AppError::StorageIo(_) => (
            500,
            "STORAGE_IO_ERROR",
            false,
            Some("Check operation outcome before retrying"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidName(_) => "InvalidName",
            AppError::InvalidPage(_) => "InvalidPage",
            AppError::PageOutOfRange { .. } => "PageOutOfRange",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::PreviewUnsupported(_) => "PreviewUnsupported",
            AppError::PreviewTimeout { .. } => "PreviewTimeout",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::StorageIo(_) => "StorageIo",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidName(ref msg) => format!("Invalid file name: {}", msg),
            AppError::InvalidPage(ref msg) => format!("Invalid page number: {}", msg),
            AppError::PageOutOfRange { page, page_count } => {
                format!(
                    "Page {} out of range: document has {} pages",
                    page, page_count
                )
            }
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::PayloadTooLarge { size, max } => {
                format!("File too large: {} bytes exceeds {} bytes", size, max)
            }
            AppError::PreviewUnsupported(ref msg) => msg.clone(),
            AppError::PreviewTimeout { seconds } => {
                format!("Preview generation timed out after {}s", seconds)
            }
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::StorageIo(_) => "Storage operation failed".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("File not found: report.pdf".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "File not found: report.pdf");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge {
            size: 200,
            max: 100,
        };
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(err.client_message().contains("200"));
        assert!(err.client_message().contains("100"));
    }

    #[test]
    fn test_error_metadata_page_out_of_range() {
        let err = AppError::PageOutOfRange {
            page: 5,
            page_count: 3,
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "PAGE_OUT_OF_RANGE");
        assert!(err.client_message().contains("5"));
        assert!(err.client_message().contains("3"));
    }

    #[test]
    fn test_error_metadata_storage_io_is_sensitive() {
        let err = AppError::StorageIo("rename failed: /data/active/x".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Storage operation failed");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_preview_timeout_recoverable() {
        let err = AppError::PreviewTimeout { seconds: 30 };
        assert_eq!(err.http_status_code(), 504);
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_unauthorized_vs_forbidden() {
        let unauthorized = AppError::Unauthorized("Missing authorization header".to_string());
        let forbidden = AppError::Forbidden("delete role required".to_string());
        assert_eq!(unauthorized.http_status_code(), 401);
        assert_eq!(forbidden.http_status_code(), 403);
        assert_ne!(unauthorized.error_code(), forbidden.error_code());
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("rename failed").context("moving file to backup");
        let err = AppError::InternalWithSource {
            message: "soft delete failed".to_string(),
            source,
        };
        let details = err.detailed_message();
        assert!(details.contains("Caused by"));
    }
}
