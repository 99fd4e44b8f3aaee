//! Catalog: listing, search, and per-file metadata over stored files.
//!
//! Read-only and lock-free by design: listings never wait on the mutation
//! locks and tolerate a slightly stale view of in-flight writes. The raw
//! directory scan reads no file content; kind enrichment reads only the
//! bounded classification window per file.

use chrono::Utc;
use docshelf_core::models::{
    FileInfoResponse, FileKind, FileResponse, ListResponse, SearchResponse, StorageArea,
};
use docshelf_core::{sanitize_filename, AppError};
use docshelf_processing::{classify, pdf_page_count, CLASSIFY_WINDOW};
use docshelf_storage::FileStore;

#[derive(Clone)]
pub struct CatalogService {
    store: FileStore,
}

impl CatalogService {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    /// List an area's files, newest-modified first, with sniffed kinds and
    /// aggregate totals.
    pub async fn list(&self, area: StorageArea) -> Result<ListResponse, AppError> {
        let files = self.store.list(area).await?;
        let mut enriched = Vec::with_capacity(files.len());
        let mut total_size_bytes = 0u64;

        for mut file in files {
            file.kind = self.sniff_kind(&file.name, area).await;
            total_size_bytes += file.size_bytes;
            enriched.push(file);
        }

        enriched.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));

        Ok(ListResponse {
            total: enriched.len(),
            total_size_bytes,
            files: enriched.into_iter().map(FileResponse::from).collect(),
        })
    }

    /// Case-insensitive substring match over active file names.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, AppError> {
        let listing = self.list(StorageArea::Active).await?;
        let needle = query.to_lowercase();

        let files: Vec<FileResponse> = listing
            .files
            .into_iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .collect();

        Ok(SearchResponse {
            query: query.to_string(),
            total: files.len(),
            files,
        })
    }

    /// Files modified within the last `days` days, newest first.
    pub async fn recent(&self, days: u32) -> Result<ListResponse, AppError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let listing = self.list(StorageArea::Active).await?;

        let files: Vec<FileResponse> = listing
            .files
            .into_iter()
            .filter(|f| f.modified_at >= cutoff)
            .collect();

        let total_size_bytes = files.iter().map(|f| f.size_bytes).sum();
        Ok(ListResponse {
            total: files.len(),
            total_size_bytes,
            files,
        })
    }

    /// Detailed metadata of one active file. PDFs report their page count.
    pub async fn info(&self, raw_name: &str) -> Result<FileInfoResponse, AppError> {
        let name = sanitize_filename(raw_name)?;
        let meta = self.store.metadata(&name, StorageArea::Active).await?;

        let kind = self
            .sniff_kind(&name, StorageArea::Active)
            .await
            .unwrap_or(FileKind::Other);

        let page_count = if kind == FileKind::Pdf {
            let data = self.store.get(&name, StorageArea::Active).await?;
            pdf_page_count(&data)
        } else {
            None
        };

        Ok(FileInfoResponse {
            name: meta.name,
            size_bytes: meta.size_bytes,
            modified_at: meta.modified_at,
            kind,
            page_count,
        })
    }

    /// Classify by bounded prefix; a file that vanished mid-scan (listings
    /// race with deletes by design) just loses its kind.
    async fn sniff_kind(&self, name: &str, area: StorageArea) -> Option<FileKind> {
        match self.store.read_prefix(name, area, CLASSIFY_WINDOW).await {
            Ok(prefix) => Some(classify(&prefix)),
            Err(_) => None,
        }
    }
}
