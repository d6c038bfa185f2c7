use mongodb::error::Error as MongoError;
use thiserror::Error;

use crate::dao::record_store::Collection;

/// Result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// Required environment variable is missing.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The rejected connection string.
        uri: String,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Building the driver client failed.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered the startup ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings tried before giving up.
        attempts: u32,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// A health check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Creating a secondary index failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the operation targeted.
        collection: Collection,
        /// Name of the index.
        index: &'static str,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Reading a record failed.
    #[error("failed to load `{key}` from `{collection}`")]
    Load {
        /// Collection the operation targeted.
        collection: Collection,
        /// Record key.
        key: String,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Writing a record failed.
    #[error("failed to write `{key}` to `{collection}`")]
    Write {
        /// Collection the operation targeted.
        collection: Collection,
        /// Record key.
        key: String,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
    /// Scanning a collection failed.
    #[error("failed to list `{collection}`")]
    List {
        /// Collection the operation targeted.
        collection: Collection,
        /// Underlying driver error.
        #[source]
        source: MongoError,
    },
}
