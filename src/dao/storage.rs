//! Error surface shared by document-tree backends.

use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable description of the failure.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored record could not be decoded back into its domain shape.
    #[error("corrupt record at `{path}`")]
    Corrupt {
        /// Tree path of the offending record.
        path: String,
        /// Decoding failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Construct a corrupt-record error for the given path.
    pub fn corrupt(path: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Corrupt {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
