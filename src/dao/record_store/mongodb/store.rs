use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Database, IndexModel,
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoRecordDocument, doc_id, lookup_filter, versioned_id},
};
use crate::dao::{
    record_store::{Collection, RecordStore, StoredDocument},
    storage::{StorageError, StorageResult},
};

const DUPLICATE_KEY: i32 = 11000;

/// [`RecordStore`] backed by MongoDB collections.
#[derive(Clone)]
pub struct MongoRecordStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY
    )
}

impl MongoRecordStore {
    /// Establish a connection to MongoDB and ensure the lookup indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        for collection in Collection::ALL {
            let index = IndexModel::builder()
                .keys(doc! { "lookup": 1 })
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{collection}_lookup_idx")))
                        .build(),
                )
                .build();

            self.collection(collection)
                .await
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index: "lookup",
                    source,
                })?;
        }
        Ok(())
    }

    async fn collection(&self, collection: Collection) -> mongodb::Collection<MongoRecordDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoRecordDocument>(collection.as_str())
    }

    async fn find_record(
        &self,
        collection: Collection,
        key: &str,
    ) -> MongoResult<Option<StoredDocument>> {
        let document = self
            .collection(collection)
            .await
            .find_one(doc_id(key))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection,
                key: key.to_owned(),
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn insert_record(
        &self,
        collection: Collection,
        document: StoredDocument,
    ) -> StorageResult<()> {
        let key = document.key.clone();
        let document = MongoRecordDocument::from(document);
        match self.collection(collection).await.insert_one(&document).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => {
                Err(StorageError::AlreadyExists { collection, key })
            }
            Err(source) => Err(MongoDaoError::Write {
                collection,
                key,
                source,
            }
            .into()),
        }
    }

    async fn replace_record(
        &self,
        collection: Collection,
        document: StoredDocument,
        expected_version: u64,
    ) -> StorageResult<()> {
        let key = document.key.clone();
        let filter = versioned_id(&key, expected_version);
        let document = MongoRecordDocument::from(document);

        let result = self
            .collection(collection)
            .await
            .replace_one(filter, &document)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection,
                key: key.clone(),
                source,
            })?;

        if result.matched_count == 0 {
            Err(StorageError::VersionConflict { collection, key })
        } else {
            Ok(())
        }
    }

    async fn list_records(
        &self,
        collection: Collection,
        filter: mongodb::bson::Document,
    ) -> MongoResult<Vec<StoredDocument>> {
        let documents: Vec<MongoRecordDocument> = self
            .collection(collection)
            .await
            .find(filter)
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|source| MongoDaoError::List { collection, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List { collection, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl RecordStore for MongoRecordStore {
    fn get(
        &self,
        collection: Collection,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_record(collection, &key)
                .await
                .map_err(Into::into)
        })
    }

    fn put(
        &self,
        collection: Collection,
        document: StoredDocument,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_record(collection, document).await })
    }

    fn update(
        &self,
        collection: Collection,
        document: StoredDocument,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_record(collection, document, expected_version)
                .await
        })
    }

    fn query(
        &self,
        collection: Collection,
        lookup_key: String,
    ) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_records(collection, lookup_filter(&lookup_key))
                .await
                .map_err(Into::into)
        })
    }

    fn scan(&self, collection: Collection) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_records(collection, doc! {})
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
