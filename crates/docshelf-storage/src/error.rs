//! Storage operation errors.

use docshelf_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Name conflict: {0}")]
    Conflict(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::Conflict(msg) => AppError::Conflict(msg),
            StorageError::TooLarge { size, max } => AppError::PayloadTooLarge { size, max },
            StorageError::InvalidName(msg) => AppError::InvalidName(msg),
            StorageError::Io(e) => AppError::StorageIo(e.to_string()),
            StorageError::Config(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_core::ErrorMetadata;

    #[test]
    fn test_not_found_maps_to_404() {
        let app: AppError = StorageError::NotFound("x".to_string()).into();
        assert_eq!(app.http_status_code(), 404);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let app: AppError = StorageError::Conflict("x".to_string()).into();
        assert_eq!(app.http_status_code(), 409);
    }

    #[test]
    fn test_too_large_maps_to_413() {
        let app: AppError = StorageError::TooLarge { size: 2, max: 1 }.into();
        assert_eq!(app.http_status_code(), 413);
    }

    #[test]
    fn test_io_maps_to_storage_io() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let app: AppError = StorageError::Io(io).into();
        assert_eq!(app.error_code(), "STORAGE_IO_ERROR");
    }
}
