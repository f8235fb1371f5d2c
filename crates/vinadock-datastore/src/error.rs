use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("Invalid datastore address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Unsupported file type for in-memory upload: {0}")]
    UnsupportedFileType(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatastoreError>;
