use std::error::Error;
use thiserror::Error;

use crate::dao::record_store::Collection;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or answered with a failure.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable summary.
        message: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A conditional write lost against a concurrent writer.
    #[error("version conflict on {collection}/{key}")]
    VersionConflict { collection: Collection, key: String },
    /// A create targeted a key that is already taken.
    #[error("record {collection}/{key} already exists")]
    AlreadyExists { collection: Collection, key: String },
    /// A stored body no longer matches the expected shape.
    #[error("record {collection}/{key} could not be decoded")]
    Corrupt {
        /// Collection holding the record.
        collection: Collection,
        /// Record key.
        key: String,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Whether the caller should reload and retry its read-modify-write.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            StorageError::VersionConflict { .. } | StorageError::AlreadyExists { .. }
        )
    }
}
