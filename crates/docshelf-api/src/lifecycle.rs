//! Lifecycle coordination: per-name mutual exclusion over mutating file
//! operations.
//!
//! Every mutation (upload, soft delete, restore, purge) acquires the
//! per-name lock before touching the file store and holds it through the
//! operation via an RAII guard, so no two mutations on the same name can
//! interleave. Operations on different names proceed independently. The
//! registry is process-local and rebuilt empty on restart; the filesystem
//! alone is authoritative.

use docshelf_core::models::StoredFile;
use docshelf_core::{sanitize_filename, AppError};
use docshelf_storage::FileStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-memory table of per-name async locks.
#[derive(Clone, Default)]
pub struct LockRegistry {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `name`, waiting behind any holder. The returned
    /// guard releases on drop, on every exit path.
    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(name.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Orchestrates upload/delete/restore/purge under per-name locks and keeps
/// the preview cache coherent across lifecycle transitions.
#[derive(Clone)]
pub struct LifecycleCoordinator {
    store: FileStore,
    locks: LockRegistry,
}

impl LifecycleCoordinator {
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            locks: LockRegistry::new(),
        }
    }

    /// Validate, store, and return the new file's metadata. Uploading over an
    /// existing active name is an atomic replace; previews of the prior
    /// generation are invalidated.
    pub async fn upload<R>(&self, raw_name: &str, reader: R) -> Result<StoredFile, AppError>
    where
        R: AsyncRead + Unpin,
    {
        let name = sanitize_filename(raw_name)?;
        let _guard = self.locks.acquire(&name).await;

        let stored = self.store.put(&name, reader).await?;
        self.invalidate_previews(&name);
        Ok(stored)
    }

    /// Move the active file into the backup area.
    pub async fn soft_delete(&self, raw_name: &str) -> Result<String, AppError> {
        let name = sanitize_filename(raw_name)?;
        let _guard = self.locks.acquire(&name).await;

        self.store.soft_delete(&name).await?;
        self.invalidate_previews(&name);
        Ok(name)
    }

    /// Move a soft-deleted file back into the active area.
    pub async fn restore(&self, raw_name: &str) -> Result<String, AppError> {
        let name = sanitize_filename(raw_name)?;
        let _guard = self.locks.acquire(&name).await;

        self.store.restore(&name).await?;
        Ok(name)
    }

    /// Permanently remove a soft-deleted file from the backup area.
    pub async fn purge(&self, raw_name: &str) -> Result<String, AppError> {
        let name = sanitize_filename(raw_name)?;
        let _guard = self.locks.acquire(&name).await;

        self.store.purge(&name).await?;
        self.invalidate_previews(&name);
        Ok(name)
    }

    /// Best-effort cache invalidation off the request path. Stale artifacts
    /// are unreachable anyway (keys carry the source's modification marker);
    /// this just frees the disk.
    fn invalidate_previews(&self, name: &str) {
        let store = self.store.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            if let Err(e) = store.purge_previews(&name).await {
                tracing::debug!(
                    error = %e,
                    name = %name,
                    "Failed to purge preview artifacts"
                );
            }
        });
    }
}
