use super::schema::UploadedFileRecord;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare record store directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Record store for uploaded-file metadata.
///
/// Records are immutable once created; there is no update or delete.
pub trait FileMetadataStore: Send + Sync {
    /// Persist a new record, assigning its id.
    fn create(&self, name: &str, graph_id: &str, size: u64) -> Result<UploadedFileRecord>;

    /// Every record, oldest first.
    fn list_all(&self) -> Result<Vec<UploadedFileRecord>>;
}

/// SQLite-backed metadata store.
pub struct SqliteFileStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFileStore {
    /// Open (or create) the store at `db_path`, creating parent directories.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::Directory {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;

        Self::init_schema(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Private in-memory store, gone when dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS uploaded_files (
                id           TEXT PRIMARY KEY,
                name         TEXT NOT NULL,
                graph_id     TEXT NOT NULL,
                size         INTEGER NOT NULL,
                uploaded_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_uploaded_files_graph ON uploaded_files(graph_id);",
        )?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<UploadedFileRecord> {
        Ok(UploadedFileRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            graph_id: row.get(2)?,
            size: row.get::<_, i64>(3)? as u64,
            uploaded_at: row.get(4)?,
        })
    }
}

impl FileMetadataStore for SqliteFileStore {
    fn create(&self, name: &str, graph_id: &str, size: u64) -> Result<UploadedFileRecord> {
        let record = UploadedFileRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            graph_id: graph_id.to_string(),
            size,
            uploaded_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO uploaded_files (id, name, graph_id, size, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.name,
                record.graph_id,
                i64::try_from(record.size).unwrap_or(i64::MAX),
                record.uploaded_at,
            ],
        )?;
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<UploadedFileRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, graph_id, size, uploaded_at
             FROM uploaded_files ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], Self::row_to_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
