//! Docshelf Storage Library
//!
//! This crate owns the on-disk layout and every durable file operation.
//!
//! # Area layout
//!
//! Three areas live under the configured base path:
//!
//! - **`active/`** - currently live, visible files
//! - **`backup/`** - soft-deleted files, recoverable via restore
//! - **`preview/`** - derived preview artifacts (pure cache)
//!
//! Path construction is centralized in the `paths` module so the traversal
//! and collision classes of bugs are eliminated at one chokepoint. All moves
//! between areas are single `rename` calls; a file is never observable
//! partially written under its final name, or present in two areas at once.

pub mod error;
pub mod paths;
pub mod store;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use paths::PathResolver;
pub use store::FileStore;
