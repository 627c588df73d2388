//! Shared handle on the document database plus its live subscriptions.
//!
//! Every write goes through here so open subscriptions on the written
//! collection see the change. Lock order is always db, then subscriptions.

use std::path::PathBuf;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::live::LiveRegistry;
use super::{DbError, DbImportRun, Document, DocumentDb, LiveQuery, Query};

pub struct DocumentStore {
    db: Mutex<DocumentDb>,
    live: LiveRegistry,
}

impl DocumentStore {
    pub fn new(db: DocumentDb) -> Self {
        DocumentStore {
            db: Mutex::new(db),
            live: LiveRegistry::default(),
        }
    }

    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        Ok(Self::new(DocumentDb::open_at(path)?))
    }

    pub fn in_memory() -> Result<Self, DbError> {
        Ok(Self::new(DocumentDb::open_in_memory()?))
    }

    /// Full-collection read.
    pub fn list(&self, collection: &str) -> Result<Vec<Document>, DbError> {
        self.db.lock().list_collection(collection)
    }

    /// Filtered read.
    pub fn query(&self, query: &Query) -> Result<Vec<Document>, DbError> {
        self.db.lock().run_query(query)
    }

    /// First document matching `query`, if any.
    pub fn find_one(&self, query: &Query) -> Result<Option<Document>, DbError> {
        Ok(self.query(query)?.into_iter().next())
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError> {
        self.db.lock().get_document(collection, id)
    }

    /// Create a document with a store-generated id.
    pub fn create(&self, collection: &str, data: Map<String, Value>) -> Result<Document, DbError> {
        let db = self.db.lock();
        let doc = db.insert_document(collection, data)?;
        self.live.publish(collection, |q| db.run_query(q));
        Ok(doc)
    }

    /// Write an imported batch and its history row in one transaction.
    pub fn import_batch(
        &self,
        collection: &str,
        bodies: Vec<Map<String, Value>>,
        source_path: &str,
        imported_by: &str,
    ) -> Result<(Vec<Document>, DbImportRun), DbError> {
        let db = self.db.lock();
        let count = bodies.len();
        let result = db.with_transaction(|tx| {
            let docs = bodies
                .into_iter()
                .map(|body| tx.insert_document(collection, body))
                .collect::<Result<Vec<_>, _>>()?;
            let run = tx.insert_import_run(collection, source_path, count, imported_by)?;
            Ok((docs, run))
        })?;
        self.live.publish(collection, |q| db.run_query(q));
        Ok(result)
    }

    pub fn recent_imports(&self, limit: usize) -> Result<Vec<DbImportRun>, DbError> {
        self.db.lock().recent_import_runs(limit)
    }

    /// Write a document under a caller-chosen id, replacing any previous body.
    pub fn put(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, DbError> {
        let db = self.db.lock();
        let doc = db.put_document(collection, id, data)?;
        self.live.publish(collection, |q| db.run_query(q));
        Ok(doc)
    }

    /// Field-merge update.
    pub fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, DbError> {
        let db = self.db.lock();
        let doc = db.merge_document(collection, id, fields)?;
        self.live.publish(collection, |q| db.run_query(q));
        Ok(doc)
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<bool, DbError> {
        let db = self.db.lock();
        let removed = db.delete_document(collection, id)?;
        if removed {
            self.live.publish(collection, |q| db.run_query(q));
        }
        Ok(removed)
    }

    /// Subscribe to `query`. The returned handle starts with the current
    /// matching set and is refreshed after each write to the collection.
    pub fn subscribe<T: DeserializeOwned>(&self, query: Query) -> Result<LiveQuery<T>, DbError> {
        let db = self.db.lock();
        let initial = db.run_query(&query)?;
        let rx = self.live.register(query, initial);
        Ok(LiveQuery::new(rx))
    }

    pub fn active_subscriptions(&self) -> usize {
        self.live.active()
    }

    pub fn collection_counts(&self) -> Result<Vec<(String, i64)>, DbError> {
        self.db.lock().collection_counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Filter;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        lead_id: String,
    }

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[tokio::test]
    async fn test_subscription_sees_later_create() {
        let store = DocumentStore::in_memory().expect("store");
        let mut live: LiveQuery<Row> = store
            .subscribe(Query::collection("leads").filter(Filter::eq("status", "New")))
            .expect("subscribe");
        assert!(live.snapshot().is_empty());

        store
            .create("leads", body(json!({"leadId": "LD-1000", "status": "New"})))
            .expect("create");

        let rows = live.changed().await.expect("changed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.lead_id, "LD-1000");
    }

    #[tokio::test]
    async fn test_subscription_ignores_other_collections() {
        let store = DocumentStore::in_memory().expect("store");
        let live: LiveQuery<Row> = store.subscribe(Query::collection("leads")).expect("subscribe");
        store
            .create("deals", body(json!({"dealId": "DL-1000"})))
            .expect("create");
        assert!(!live.has_changed());
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let store = DocumentStore::in_memory().expect("store");
        let live: LiveQuery<Row> = store.subscribe(Query::collection("leads")).expect("subscribe");
        assert_eq!(store.active_subscriptions(), 1);
        drop(live);
        store
            .create("leads", body(json!({"leadId": "LD-1001"})))
            .expect("create");
        assert_eq!(store.active_subscriptions(), 0);
    }
}
