use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde_json::{from_value, json};

use crate::dao::{
    record_store::{Collection, RecordStore, StoredDocument},
    storage::{StorageError, StorageResult},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchRecordDocument, END_SUFFIX, FindResponse, collection_prefix,
        record_doc_id,
    },
};

const FIND_LIMIT: usize = 10_000;

/// Outcome of a document PUT that CouchDB may refuse on revision mismatch.
enum PutOutcome {
    Written,
    Conflict,
}

/// [`RecordStore`] backed by a single CouchDB database.
#[derive(Clone)]
pub struct CouchRecordStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchRecordStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        self.with_auth(self.client.request(method, url))
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                // 412: created concurrently by another instance
                if create.status().is_success() || create.status() == StatusCode::PRECONDITION_FAILED {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document(&self, doc_id: &str) -> CouchResult<Option<CouchRecordDocument>> {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<CouchRecordDocument>()
                .await
                .map(Some)
                .map_err(|source| CouchDaoError::DecodeResponse {
                    path: doc_id.to_string(),
                    source,
                }),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document(&self, document: &CouchRecordDocument) -> CouchResult<PutOutcome> {
        let response = self
            .request(Method::PUT, &document.id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: document.id.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Ok(PutOutcome::Conflict),
            status if status.is_success() => Ok(PutOutcome::Written),
            other => Err(CouchDaoError::RequestStatus {
                path: document.id.clone(),
                status: other,
            }),
        }
    }

    fn parse_documents(path: &str, values: Vec<serde_json::Value>) -> CouchResult<Vec<StoredDocument>> {
        let mut documents = values
            .into_iter()
            .map(|value| {
                from_value::<CouchRecordDocument>(value)
                    .map(CouchRecordDocument::into_stored)
                    .map_err(|source| CouchDaoError::DeserializeValue {
                        path: path.to_string(),
                        source,
                    })
            })
            .collect::<CouchResult<Vec<_>>>()?;
        documents.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(documents)
    }

    async fn list_documents(&self, collection: Collection) -> CouchResult<Vec<StoredDocument>> {
        const ALL_DOCS: &str = "_all_docs";
        let prefix = collection_prefix(collection);
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{prefix}\"")),
            ("endkey", format!("\"{prefix}{END_SUFFIX}\"")),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        let docs = payload.rows.into_iter().filter_map(|row| row.doc).collect();
        Self::parse_documents(ALL_DOCS, docs)
    }

    async fn find_documents(
        &self,
        collection: Collection,
        lookup_key: &str,
    ) -> CouchResult<Vec<StoredDocument>> {
        const FIND: &str = "_find";
        let selector = json!({
            "selector": {
                "collection": collection,
                "lookup": { "$elemMatch": { "$eq": lookup_key } }
            },
            "limit": FIND_LIMIT,
        });

        let response = self
            .request(Method::POST, FIND)
            .json(&selector)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: FIND.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: FIND.to_string(),
                status: response.status(),
            });
        }

        let payload = response
            .json::<FindResponse>()
            .await
            .map_err(|source| CouchDaoError::DecodeResponse {
                path: FIND.to_string(),
                source,
            })?;
        Self::parse_documents(FIND, payload.docs)
    }
}

impl RecordStore for CouchRecordStore {
    fn get(
        &self,
        collection: Collection,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = store
                .get_document(&record_doc_id(collection, &key))
                .await?;
            Ok(doc.map(CouchRecordDocument::into_stored))
        })
    }

    fn put(
        &self,
        collection: Collection,
        document: StoredDocument,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let key = document.key.clone();
            let doc = CouchRecordDocument::new(collection, document, None);
            match store.put_document(&doc).await? {
                PutOutcome::Written => Ok(()),
                PutOutcome::Conflict => Err(StorageError::AlreadyExists { collection, key }),
            }
        })
    }

    fn update(
        &self,
        collection: Collection,
        document: StoredDocument,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let key = document.key.clone();
            let conflict = || StorageError::VersionConflict {
                collection,
                key: key.clone(),
            };

            let Some(current) = store
                .get_document(&record_doc_id(collection, &key))
                .await?
            else {
                return Err(conflict());
            };
            if current.version != expected_version {
                return Err(conflict());
            }

            // the revision read above makes CouchDB reject interleaved writers
            let doc = CouchRecordDocument::new(collection, document, current.rev);
            match store.put_document(&doc).await? {
                PutOutcome::Written => Ok(()),
                PutOutcome::Conflict => Err(conflict()),
            }
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
                .find_documents(collection, &lookup_key)
                .await
                .map_err(Into::into)
        })
    }

    fn scan(&self, collection: Collection) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move { store.list_documents(collection).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .with_auth(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
