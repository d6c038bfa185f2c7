//! Typed access to the [`RecordStore`] for the engine's entities.

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::dao::{
    models::{ActivityEntity, MatchEntity, PlayerEntity, TeamEntity},
    record_store::{Collection, RecordStore, StoredDocument},
    storage::{StorageError, StorageResult},
};

/// Entity that lives in one collection of the record store.
pub trait Record: Serialize + DeserializeOwned + Send + 'static {
    /// Collection the record is stored in.
    const COLLECTION: Collection;

    /// Primary key.
    fn key(&self) -> String;

    /// Secondary keys the record can be queried by.
    fn lookup_keys(&self) -> Vec<String> {
        Vec::new()
    }
}

impl Record for MatchEntity {
    const COLLECTION: Collection = Collection::Matches;

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn lookup_keys(&self) -> Vec<String> {
        vec![
            team_lookup(self.home_team_id),
            team_lookup(self.away_team_id),
        ]
    }
}

impl Record for ActivityEntity {
    const COLLECTION: Collection = Collection::Activities;

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn lookup_keys(&self) -> Vec<String> {
        vec![team_lookup(self.club_id)]
    }
}

impl Record for TeamEntity {
    const COLLECTION: Collection = Collection::Teams;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Record for PlayerEntity {
    const COLLECTION: Collection = Collection::Players;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Secondary key used to find matches and activities of a team or club.
pub fn team_lookup(team_id: Uuid) -> String {
    format!("team:{team_id}")
}

/// A decoded record together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// Version the record was read at.
    pub version: u64,
    /// The decoded record.
    pub record: T,
}

fn encode<T: Record>(record: &T, version: u64) -> StorageResult<StoredDocument> {
    let key = record.key();
    let body = serde_json::to_value(record).map_err(|source| StorageError::Corrupt {
        collection: T::COLLECTION,
        key: key.clone(),
        source,
    })?;
    Ok(StoredDocument {
        key,
        version,
        lookup: record.lookup_keys(),
        body,
    })
}

fn decode<T: Record>(document: StoredDocument) -> StorageResult<Versioned<T>> {
    let StoredDocument {
        key, version, body, ..
    } = document;
    let record = serde_json::from_value(body).map_err(|source| StorageError::Corrupt {
        collection: T::COLLECTION,
        key,
        source,
    })?;
    Ok(Versioned { version, record })
}

/// Load a record by primary key.
pub async fn find<T: Record>(store: &dyn RecordStore, key: &str) -> StorageResult<Option<Versioned<T>>> {
    store
        .get(T::COLLECTION, key.to_owned())
        .await?
        .map(decode)
        .transpose()
}

/// Create a record at version 1.
pub async fn create<T: Record>(store: &dyn RecordStore, record: T) -> StorageResult<Versioned<T>> {
    let document = encode(&record, 1)?;
    store.put(T::COLLECTION, document).await?;
    Ok(Versioned { version: 1, record })
}

/// Persist `record` over the version it was read at, bumping the version.
pub async fn replace<T: Record>(
    store: &dyn RecordStore,
    read_version: u64,
    record: T,
) -> StorageResult<Versioned<T>> {
    let next = read_version + 1;
    let document = encode(&record, next)?;
    store.update(T::COLLECTION, document, read_version).await?;
    Ok(Versioned {
        version: next,
        record,
    })
}

/// Records reachable through a secondary key.
pub async fn query<T: Record>(store: &dyn RecordStore, lookup_key: String) -> StorageResult<Vec<T>> {
    store
        .query(T::COLLECTION, lookup_key)
        .await?
        .into_iter()
        .map(|document| decode(document).map(|versioned: Versioned<T>| versioned.record))
        .collect()
}

/// Every record of the entity's collection with its version.
pub async fn scan<T: Record>(store: &dyn RecordStore) -> StorageResult<Vec<Versioned<T>>> {
    store
        .scan(T::COLLECTION)
        .await?
        .into_iter()
        .map(decode)
        .collect()
}
