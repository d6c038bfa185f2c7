use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::record_store::{Collection, StoredDocument};

pub const KEY_SEPARATOR: &str = "::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Response of a Mango `_find` query.
#[derive(Debug, Deserialize)]
pub struct FindResponse {
    pub docs: Vec<Value>,
}

/// A record as persisted in CouchDB. `_rev` guards the write, `version`
/// mirrors the backend-neutral counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchRecordDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub collection: Collection,
    pub key: String,
    pub version: u64,
    #[serde(default)]
    pub lookup: Vec<String>,
    pub body: Value,
}

impl CouchRecordDocument {
    pub fn new(collection: Collection, document: StoredDocument, rev: Option<String>) -> Self {
        Self {
            id: record_doc_id(collection, &document.key),
            rev,
            collection,
            key: document.key,
            version: document.version,
            lookup: document.lookup,
            body: document.body,
        }
    }

    pub fn into_stored(self) -> StoredDocument {
        StoredDocument {
            key: self.key,
            version: self.version,
            lookup: self.lookup,
            body: self.body,
        }
    }
}

/// Prefix shared by every document of a collection.
pub fn collection_prefix(collection: Collection) -> String {
    format!("{}{KEY_SEPARATOR}", collection.as_str())
}

pub fn record_doc_id(collection: Collection, key: &str) -> String {
    format!("{}{key}", collection_prefix(collection))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn document_keeps_metadata_next_to_the_body() {
        let stored = StoredDocument {
            key: "abc".into(),
            version: 3,
            lookup: vec!["team:1".into()],
            body: json!({ "sport": "soccer" }),
        };
        let doc = CouchRecordDocument::new(Collection::Matches, stored.clone(), Some("2-x".into()));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_id"], "matches::abc");
        assert_eq!(value["_rev"], "2-x");
        assert_eq!(value["collection"], "matches");

        let back: CouchRecordDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back.into_stored(), stored);
    }

    #[test]
    fn new_documents_omit_the_revision() {
        let doc = CouchRecordDocument::new(
            Collection::Teams,
            StoredDocument {
                key: "t".into(),
                version: 1,
                lookup: Vec::new(),
                body: json!({}),
            },
            None,
        );
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("_rev").is_none());
    }
}
