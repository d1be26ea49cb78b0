use serde::{Deserialize, Serialize};

/// Metadata kept for every uploaded Turtle file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFileRecord {
    pub id: String,
    pub name: String,
    pub graph_id: String,
    pub size: u64,
    pub uploaded_at: String,
}

/// Projection returned by `GET /files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub graph_id: String,
    pub size: u64,
    pub id: String,
}

impl From<UploadedFileRecord> for FileSummary {
    fn from(record: UploadedFileRecord) -> Self {
        Self {
            name: record.name,
            graph_id: record.graph_id,
            size: record.size,
            id: record.id,
        }
    }
}

/// `{"files": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileSummary>,
}
