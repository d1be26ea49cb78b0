//! Uploaded-file metadata: record types and the SQLite record store.

pub mod index;
pub mod schema;

pub use index::{FileMetadataStore, SqliteFileStore, StorageError};
pub use schema::{FileListResponse, FileSummary, UploadedFileRecord};
