//! Domain models

pub mod file;

pub use file::{
    FileActionResponse, FileInfoResponse, FileKind, FileResponse, ListResponse, SearchResponse,
    StorageArea, StoredFile, UploadResponse, UploadedFile,
};
