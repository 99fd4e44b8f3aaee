use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Document kind, determined by content sniffing (never by file extension).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Image,
    Word,
    Excel,
    Powerpoint,
    Other,
}

impl FileKind {
    /// Whether a preview can be generated for this kind.
    pub fn previewable(&self) -> bool {
        !matches!(self, FileKind::Other)
    }

    /// Whether previewing goes through the office-to-PDF conversion path.
    pub fn needs_conversion(&self) -> bool {
        matches!(self, FileKind::Word | FileKind::Excel | FileKind::Powerpoint)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Image => "image",
            FileKind::Word => "word",
            FileKind::Excel => "excel",
            FileKind::Powerpoint => "powerpoint",
            FileKind::Other => "other",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three on-disk areas rooted at the configured base path.
///
/// A stored file lives in exactly one of `Active` or `Backup`; `Preview`
/// holds derived artifacts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    Active,
    Backup,
    Preview,
}

impl StorageArea {
    pub fn dir_name(&self) -> &'static str {
        match self {
            StorageArea::Active => "active",
            StorageArea::Backup => "backup",
            StorageArea::Preview => "preview",
        }
    }
}

impl std::fmt::Display for StorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Metadata of one logical document. Size and modification time are derived
/// from the underlying storage, never tracked independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    /// Populated by the catalog layer via a bounded prefix sniff; a raw
    /// directory scan leaves this unset.
    pub kind: Option<FileKind>,
}

/// File metadata as returned by listing and search endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponse {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FileKind>,
}

impl From<StoredFile> for FileResponse {
    fn from(f: StoredFile) -> Self {
        FileResponse {
            name: f.name,
            size_bytes: f.size_bytes,
            modified_at: f.modified_at,
            kind: f.kind,
        }
    }
}

/// Detailed metadata for a single file; PDFs additionally report page count.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileInfoResponse {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    pub files: Vec<FileResponse>,
    pub total: usize,
    pub total_size_bytes: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub files: Vec<FileResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub kind: FileKind,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
    pub total: usize,
    pub total_size_bytes: u64,
}

/// Outcome of a lifecycle mutation (soft delete, restore, purge).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileActionResponse {
    pub name: String,
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_previewable() {
        assert!(FileKind::Pdf.previewable());
        assert!(FileKind::Image.previewable());
        assert!(FileKind::Word.previewable());
        assert!(!FileKind::Other.previewable());
    }

    #[test]
    fn test_file_kind_needs_conversion() {
        assert!(FileKind::Word.needs_conversion());
        assert!(FileKind::Excel.needs_conversion());
        assert!(FileKind::Powerpoint.needs_conversion());
        assert!(!FileKind::Pdf.needs_conversion());
        assert!(!FileKind::Image.needs_conversion());
    }

    #[test]
    fn test_file_kind_serializes_lowercase() {
        let json = serde_json::to_string(&FileKind::Powerpoint).unwrap();
        assert_eq!(json, "\"powerpoint\"");
    }

    #[test]
    fn test_storage_area_dir_names() {
        assert_eq!(StorageArea::Active.dir_name(), "active");
        assert_eq!(StorageArea::Backup.dir_name(), "backup");
        assert_eq!(StorageArea::Preview.dir_name(), "preview");
    }

    #[test]
    fn test_file_response_from_stored_file() {
        let stored = StoredFile {
            name: "report.pdf".to_string(),
            size_bytes: 1024,
            modified_at: Utc::now(),
            kind: Some(FileKind::Pdf),
        };
        let response = FileResponse::from(stored);
        assert_eq!(response.name, "report.pdf");
        assert_eq!(response.size_bytes, 1024);
        assert_eq!(response.kind, Some(FileKind::Pdf));
    }
}
