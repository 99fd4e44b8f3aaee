//! Docshelf API Library
//!
//! This crate provides the HTTP API handlers, authentication boundary,
//! lifecycle coordination, and application setup.

// Module declarations
mod api_doc;
mod handlers;

// Public modules
pub mod auth;
pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::ErrorResponse;
pub use lifecycle::{LifecycleCoordinator, LockRegistry};
pub use state::AppState;
