use chrono::Utc;
use rusqlite::params;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::*;

impl DocumentDb {
    // =========================================================================
    // Documents
    // =========================================================================

    /// Helper: map a row to `Document`.
    fn map_document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Document, String)> {
        let raw: String = row.get(2)?;
        Ok((
            Document {
                collection: row.get(0)?,
                id: row.get(1)?,
                data: Map::new(),
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            },
            raw,
        ))
    }

    fn hydrate(pair: (Document, String)) -> Result<Document, DbError> {
        let (mut doc, raw) = pair;
        doc.data = match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => map,
            _ => return Err(DbError::NotAnObject),
        };
        Ok(doc)
    }

    /// Insert a new document and return it with its generated id.
    pub fn insert_document(
        &self,
        collection: &str,
        data: Map<String, Value>,
    ) -> Result<Document, DbError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (collection, id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![collection, id, serde_json::to_string(&data)?, now],
        )?;
        Ok(Document {
            id,
            collection: collection.to_string(),
            data,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Insert or replace a document under a caller-chosen id.
    ///
    /// Used for documents keyed by a natural key, such as `users/<email>`.
    pub fn put_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (collection, id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(collection, id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at",
            params![collection, id, serde_json::to_string(&data)?, now],
        )?;
        self.get_document(collection, id)?
            .ok_or_else(|| DbError::Missing {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    /// Get a document by its store id.
    pub fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT collection, id, data, created_at, updated_at
             FROM documents WHERE collection = ?1 AND id = ?2",
        )?;
        let mut rows = stmt.query_map(params![collection, id], Self::map_document_row)?;
        match rows.next() {
            Some(row) => Ok(Some(Self::hydrate(row?)?)),
            None => Ok(None),
        }
    }

    /// All documents in a collection, oldest first.
    pub fn list_collection(&self, collection: &str) -> Result<Vec<Document>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT collection, id, data, created_at, updated_at
             FROM documents WHERE collection = ?1
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map(params![collection], Self::map_document_row)?;
        let mut docs = Vec::new();
        for row in rows {
            docs.push(Self::hydrate(row?)?);
        }
        Ok(docs)
    }

    /// Run a filtered read. Filters are evaluated on the decoded JSON body.
    pub fn run_query(&self, query: &Query) -> Result<Vec<Document>, DbError> {
        let docs = self.list_collection(&query.collection)?;
        let total = docs.len();
        let matched: Vec<Document> = docs.into_iter().filter(|d| query.matches(d)).collect();
        log::debug!(
            "Query on '{}' with {} filter(s): {}/{} documents",
            query.collection,
            query.filters.len(),
            matched.len(),
            total
        );
        Ok(matched)
    }

    /// Merge `fields` into an existing document. Fields not named are kept.
    pub fn merge_document(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, DbError> {
        let mut doc = self
            .get_document(collection, id)?
            .ok_or_else(|| DbError::Missing {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (key, value) in fields {
            doc.data.insert(key, value);
        }
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE documents SET data = ?1, updated_at = ?2
             WHERE collection = ?3 AND id = ?4",
            params![serde_json::to_string(&doc.data)?, now, collection, id],
        )?;
        doc.updated_at = now;
        Ok(doc)
    }

    /// Delete a document. Returns whether a row was removed.
    pub fn delete_document(&self, collection: &str, id: &str) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(changed > 0)
    }

    /// Count documents per collection.
    pub fn collection_counts(&self) -> Result<Vec<(String, i64)>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT collection, COUNT(*) FROM documents
             GROUP BY collection ORDER BY collection",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
