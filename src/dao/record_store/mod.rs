/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::dao::storage::StorageResult;

/// Logical collections held by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Match records keyed by match id.
    Matches,
    /// Activity records keyed by activity id.
    Activities,
    /// Team records keyed by team id.
    Teams,
    /// Player records keyed by identity.
    Players,
}

impl Collection {
    /// Every collection, in a stable order.
    pub const ALL: [Collection; 4] = [
        Collection::Matches,
        Collection::Activities,
        Collection::Teams,
        Collection::Players,
    ];

    /// Name used by backends for tables, prefixes and collections.
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Matches => "matches",
            Collection::Activities => "activities",
            Collection::Teams => "teams",
            Collection::Players => "players",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-neutral stored record.
///
/// `version` starts at 1 on creation and grows by one on every accepted
/// conditional write. `lookup` holds the secondary keys the record can be
/// queried by (for example the ids of both teams of a match).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Primary key.
    pub key: String,
    /// Optimistic concurrency counter.
    pub version: u64,
    /// Secondary keys.
    pub lookup: Vec<String>,
    /// Serialized record.
    pub body: serde_json::Value,
}

/// Abstraction over the persistence layer for every engine record.
pub trait RecordStore: Send + Sync {
    /// Fetch a record by primary key.
    fn get(
        &self,
        collection: Collection,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>>;

    /// Create a record. Fails with `AlreadyExists` when the key is taken.
    fn put(
        &self,
        collection: Collection,
        document: StoredDocument,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Replace a record only if its stored version still equals `expected_version`.
    fn update(
        &self,
        collection: Collection,
        document: StoredDocument,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Records whose lookup keys contain `lookup_key`.
    fn query(
        &self,
        collection: Collection,
        lookup_key: String,
    ) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>>;

    /// Every record of a collection.
    fn scan(&self, collection: Collection) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>>;

    /// Check that the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
