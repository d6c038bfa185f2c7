//! In-process [`RecordStore`] used by default and by the test suites.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;

use super::{Collection, RecordStore, StoredDocument};
use crate::dao::storage::{StorageError, StorageResult};

type RecordKey = (Collection, String);

/// DashMap-backed store. Conditional writes hold the shard lock for the key,
/// so version checks and replacements are atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<DashMap<RecordKey, StoredDocument>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn get_sync(&self, collection: Collection, key: String) -> Option<StoredDocument> {
        self.records
            .get(&(collection, key))
            .map(|entry| entry.value().clone())
    }

    fn put_sync(&self, collection: Collection, document: StoredDocument) -> StorageResult<()> {
        match self.records.entry((collection, document.key.clone())) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists {
                collection,
                key: document.key,
            }),
            Entry::Vacant(slot) => {
                slot.insert(document);
                Ok(())
            }
        }
    }

    fn update_sync(
        &self,
        collection: Collection,
        document: StoredDocument,
        expected_version: u64,
    ) -> StorageResult<()> {
        match self.records.entry((collection, document.key.clone())) {
            Entry::Occupied(mut current) if current.get().version == expected_version => {
                current.insert(document);
                Ok(())
            }
            _ => Err(StorageError::VersionConflict {
                collection,
                key: document.key,
            }),
        }
    }

    fn collect_where(
        &self,
        collection: Collection,
        keep: impl Fn(&StoredDocument) -> bool,
    ) -> Vec<StoredDocument> {
        let mut documents: Vec<StoredDocument> = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == collection && keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        documents.sort_by(|a, b| a.key.cmp(&b.key));
        documents
    }
}

impl RecordStore for MemoryStore {
    fn get(
        &self,
        collection: Collection,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>> {
        let result = self.get_sync(collection, key);
        Box::pin(async move { Ok(result) })
    }

    fn put(
        &self,
        collection: Collection,
        document: StoredDocument,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.put_sync(collection, document);
        Box::pin(async move { result })
    }

    fn update(
        &self,
        collection: Collection,
        document: StoredDocument,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.update_sync(collection, document, expected_version);
        Box::pin(async move { result })
    }

    fn query(
        &self,
        collection: Collection,
        lookup_key: String,
    ) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let documents = self.collect_where(collection, |doc| doc.lookup.contains(&lookup_key));
        Box::pin(async move { Ok(documents) })
    }

    fn scan(&self, collection: Collection) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let documents = self.collect_where(collection, |_| true);
        Box::pin(async move { Ok(documents) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
