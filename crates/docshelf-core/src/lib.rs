//! Docshelf Core Library
//!
//! This crate provides core domain models, error types, configuration, and
//! filename validation shared across all Docshelf components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{FileKind, StorageArea, StoredFile};
pub use validation::sanitize_filename;
