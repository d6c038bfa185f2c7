use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::record_store::StoredDocument;

/// A record as persisted in MongoDB: one document per key, guarded by `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRecordDocument {
    #[serde(rename = "_id")]
    key: String,
    version: i64,
    #[serde(default)]
    lookup: Vec<String>,
    body: Value,
}

impl From<StoredDocument> for MongoRecordDocument {
    fn from(value: StoredDocument) -> Self {
        Self {
            key: value.key,
            version: version_to_bson(value.version),
            lookup: value.lookup,
            body: value.body,
        }
    }
}

impl From<MongoRecordDocument> for StoredDocument {
    fn from(value: MongoRecordDocument) -> Self {
        Self {
            key: value.key,
            version: u64::try_from(value.version).unwrap_or_default(),
            lookup: value.lookup,
            body: value.body,
        }
    }
}

/// BSON has no unsigned integers; versions never come close to `i64::MAX`.
pub fn version_to_bson(version: u64) -> i64 {
    i64::try_from(version).unwrap_or(i64::MAX)
}

pub fn doc_id(key: &str) -> Document {
    doc! { "_id": key }
}

/// Filter that only matches the record while it still carries `version`.
pub fn versioned_id(key: &str, version: u64) -> Document {
    doc! { "_id": key, "version": version_to_bson(version) }
}

/// Filter on array membership of a secondary key.
pub fn lookup_filter(lookup_key: &str) -> Document {
    doc! { "lookup": lookup_key }
}
