use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidtransError {
    #[error("Storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage write failed at {path}: {source}")]
    StorageWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record at {path}: {source}")]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing API key: set one with `vidtrans settings set --api-key <KEY>`")]
    MissingApiKey,

    #[error("No target languages selected")]
    NoLanguages,

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected backend response: {reason}")]
    UnexpectedResponse { reason: String },
}

impl VidtransError {
    /// Storage failures are recoverable: callers fall back to the backend.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            VidtransError::StorageUnavailable { .. }
                | VidtransError::StorageWriteFailed { .. }
                | VidtransError::CorruptRecord { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VidtransError>;
