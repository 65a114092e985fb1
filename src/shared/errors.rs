use thiserror::Error;

/// Common storage-related errors shared by both backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to read or write data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Data not found: {0}")]
    NotFound(String),
}

impl StorageError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        StorageError::NotFound(msg.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
