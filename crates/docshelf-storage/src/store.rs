//! File store: atomic create/read/move/delete over the three storage areas.

use crate::error::{StorageError, StorageResult};
use crate::paths::PathResolver;
use bytes::Bytes;
use docshelf_core::models::{StorageArea, StoredFile};
use futures::Stream;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::UNIX_EPOCH;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Owns every durable file operation. Writes go through a hidden temp file
/// followed by an atomic rename, so a reader can never observe a truncated
/// file under its final name. Moves between areas are single renames.
///
/// The store itself is lock-free; per-name mutual exclusion is the lifecycle
/// coordinator's job.
#[derive(Clone)]
pub struct FileStore {
    resolver: PathResolver,
    max_file_size: u64,
}

impl FileStore {
    /// Create a new FileStore rooted at `base_path`, creating the three area
    /// directories if they do not exist yet.
    pub async fn new(base_path: impl Into<PathBuf>, max_file_size: u64) -> StorageResult<Self> {
        let resolver = PathResolver::new(base_path);

        for area in [StorageArea::Active, StorageArea::Backup, StorageArea::Preview] {
            let root = resolver.area_root(area);
            fs::create_dir_all(&root).await.map_err(|e| {
                StorageError::Config(format!(
                    "Failed to create storage directory {}: {}",
                    root.display(),
                    e
                ))
            })?;
        }

        Ok(FileStore {
            resolver,
            max_file_size,
        })
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Store content under `name` in the active area.
    ///
    /// The stream is spooled to a hidden temp file with the byte count
    /// checked as it is consumed; exceeding the ceiling aborts with
    /// `TooLarge` before anything becomes visible. On success the temp file
    /// is fsynced and atomically renamed into place, replacing any previous
    /// file of the same name.
    pub async fn put<R>(&self, name: &str, reader: R) -> StorageResult<StoredFile>
    where
        R: AsyncRead + Unpin,
    {
        let final_path = self.resolver.resolve(name, StorageArea::Active)?;
        let tmp_path = self
            .resolver
            .area_root(StorageArea::Active)
            .join(format!(".tmp-{}", Uuid::new_v4()));

        let start = std::time::Instant::now();

        let written = match self.spool_to_temp(&tmp_path, reader).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup_err) = fs::remove_file(&tmp_path).await {
                    tracing::debug!(
                        error = %cleanup_err,
                        path = %tmp_path.display(),
                        "Failed to remove temp file after aborted upload"
                    );
                }
                return Err(e);
            }
        };

        fs::rename(&tmp_path, &final_path).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to move upload into place: {}", e),
            ))
        })?;

        let stored = self.metadata(name, StorageArea::Active).await?;

        tracing::info!(
            name = %name,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File stored"
        );

        Ok(stored)
    }

    async fn spool_to_temp<R>(&self, tmp_path: &Path, mut reader: R) -> StorageResult<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut file = fs::File::create(tmp_path).await?;
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        let mut written: u64 = 0;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            written += n as u64;
            if written > self.max_file_size {
                return Err(StorageError::TooLarge {
                    size: written,
                    max: self.max_file_size,
                });
            }
            file.write_all(&buf[..n]).await?;
        }

        file.sync_all().await?;
        Ok(written)
    }

    /// Read the full content of a file in the given area.
    pub async fn get(&self, name: &str, area: StorageArea) -> StorageResult<Vec<u8>> {
        let path = self.resolver.resolve(name, area)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(not_found_msg(name, area)));
        }
        Ok(fs::read(&path).await?)
    }

    /// Stream the content of a file in the active area in chunks.
    pub async fn stream(
        &self,
        name: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>> {
        let path = self.resolver.resolve(name, StorageArea::Active)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(not_found_msg(
                name,
                StorageArea::Active,
            )));
        }

        let file = fs::File::open(&path).await?;
        let reader = tokio_util::io::ReaderStream::new(file);
        let stream = reader.map(|result| result.map_err(StorageError::Io));
        Ok(Box::pin(stream))
    }

    /// Read at most `max` leading bytes of a file, for content classification.
    pub async fn read_prefix(
        &self,
        name: &str,
        area: StorageArea,
        max: usize,
    ) -> StorageResult<Vec<u8>> {
        let path = self.resolver.resolve(name, area)?;
        let mut file = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(not_found_msg(name, area)));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut buf = vec![0u8; max];
        let mut filled = 0;
        while filled < max {
            let n = file.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(buf)
    }

    /// Metadata of one file in the given area, derived from the filesystem.
    pub async fn metadata(&self, name: &str, area: StorageArea) -> StorageResult<StoredFile> {
        let path = self.resolver.resolve(name, area)?;
        let meta = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(not_found_msg(name, area)));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        Ok(StoredFile {
            name: name.to_string(),
            size_bytes: meta.len(),
            modified_at: meta.modified().map(Into::into).unwrap_or_else(|_| {
                chrono::Utc::now()
            }),
            kind: None,
        })
    }

    pub async fn exists(&self, name: &str, area: StorageArea) -> StorageResult<bool> {
        let path = self.resolver.resolve(name, area)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Modification marker of the active file: mtime in nanoseconds since the
    /// epoch. Changes on every re-upload, which is what keys preview
    /// artifacts to the exact content generation they were rendered from.
    pub async fn modified_marker(&self, name: &str) -> StorageResult<u128> {
        let path = self.resolver.resolve(name, StorageArea::Active)?;
        let meta = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(not_found_msg(
                    name,
                    StorageArea::Active,
                )));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };
        let modified = meta.modified()?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0))
    }

    /// Atomically move a file from the active area to the backup area.
    pub async fn soft_delete(&self, name: &str) -> StorageResult<()> {
        let from = self.resolver.resolve(name, StorageArea::Active)?;
        let to = self.resolver.resolve(name, StorageArea::Backup)?;

        if !fs::try_exists(&from).await.unwrap_or(false) {
            return Err(StorageError::NotFound(not_found_msg(
                name,
                StorageArea::Active,
            )));
        }
        if fs::try_exists(&to).await.unwrap_or(false) {
            return Err(StorageError::Conflict(format!(
                "Backup already holds a file named {}",
                name
            )));
        }

        fs::rename(&from, &to).await?;

        tracing::info!(name = %name, "File soft-deleted to backup");
        Ok(())
    }

    /// Atomically move a file from the backup area back to the active area.
    pub async fn restore(&self, name: &str) -> StorageResult<()> {
        let from = self.resolver.resolve(name, StorageArea::Backup)?;
        let to = self.resolver.resolve(name, StorageArea::Active)?;

        if !fs::try_exists(&from).await.unwrap_or(false) {
            return Err(StorageError::NotFound(not_found_msg(
                name,
                StorageArea::Backup,
            )));
        }
        if fs::try_exists(&to).await.unwrap_or(false) {
            return Err(StorageError::Conflict(format!(
                "Active area already holds a file named {}",
                name
            )));
        }

        fs::rename(&from, &to).await?;

        tracing::info!(name = %name, "File restored from backup");
        Ok(())
    }

    /// Permanently remove a soft-deleted file from the backup area.
    pub async fn purge(&self, name: &str) -> StorageResult<()> {
        let path = self.resolver.resolve(name, StorageArea::Backup)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(not_found_msg(
                name,
                StorageArea::Backup,
            )));
        }

        fs::remove_file(&path).await?;

        tracing::info!(name = %name, "File purged from backup");
        Ok(())
    }

    /// List file metadata in an area. Pure directory scan: no content reads.
    /// Hidden entries (in-flight temp files) and subdirectories are skipped.
    pub async fn list(&self, area: StorageArea) -> StorageResult<Vec<StoredFile>> {
        let root = self.resolver.area_root(area);
        let mut entries = fs::read_dir(&root).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let name = match file_name.to_str() {
                Some(n) => n,
                None => continue,
            };
            if name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            files.push(StoredFile {
                name: name.to_string(),
                size_bytes: meta.len(),
                modified_at: meta
                    .modified()
                    .map(Into::into)
                    .unwrap_or_else(|_| chrono::Utc::now()),
                kind: None,
            });
        }

        Ok(files)
    }

    // ----- Preview artifact cache -----

    /// Write a preview artifact. Same temp-then-rename discipline as `put`,
    /// so concurrent readers of the cache never see a partial artifact.
    pub async fn put_preview(&self, artifact_name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.resolver.resolve(artifact_name, StorageArea::Preview)?;
        let tmp_path = self
            .resolver
            .area_root(StorageArea::Preview)
            .join(format!(".tmp-{}", Uuid::new_v4()));

        let mut file = fs::File::create(&tmp_path).await?;
        if let Err(e) = file.write_all(data).await {
            drop(file);
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(e));
        }
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &path).await?;

        tracing::debug!(artifact = %artifact_name, size_bytes = data.len(), "Preview artifact cached");
        Ok(())
    }

    /// Fetch a cached preview artifact, if present.
    pub async fn get_preview(&self, artifact_name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.resolver.resolve(artifact_name, StorageArea::Preview)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Remove every cached artifact belonging to `name` (any page, any
    /// generation). Best-effort by contract: the cache is fully derivable.
    pub async fn purge_previews(&self, name: &str) -> StorageResult<usize> {
        let prefix = format!("{}.", name);
        let root = self.resolver.area_root(StorageArea::Preview);
        let mut entries = fs::read_dir(&root).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let artifact = match file_name.to_str() {
                Some(n) => n,
                None => continue,
            };
            let suffix = match artifact.strip_prefix(&prefix) {
                Some(s) => s,
                None => continue,
            };
            if is_artifact_suffix(suffix) && fs::remove_file(entry.path()).await.is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(name = %name, removed, "Preview artifacts purged");
        }
        Ok(removed)
    }
}

/// Matches the `{marker}.p{page}.png` tail of an artifact name, so purging
/// previews for `report` never touches artifacts of `report.pdf`.
fn is_artifact_suffix(suffix: &str) -> bool {
    let Some((marker, rest)) = suffix.split_once('.') else {
        return false;
    };
    if marker.is_empty() || !marker.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Some(page) = rest.strip_prefix('p').and_then(|r| r.strip_suffix(".png")) else {
        return false;
    };
    !page.is_empty() && page.bytes().all(|b| b.is_ascii_digit())
}

fn not_found_msg(name: &str, area: StorageArea) -> String {
    format!("File not found in {} area: {}", area, name)
}
