//! Shared type definitions for the document store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Document body must be a JSON object")]
    NotAnObject,

    #[error("Document {collection}/{id} not found")]
    Missing { collection: String, id: String },
}

/// A row from the `documents` table: one schema-less document in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub data: Map<String, Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl Document {
    /// Look up a field by dotted path (`"address.city"`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.data.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Deserialize the document body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }
}

/// A typed record together with its store metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    pub doc_id: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub record: T,
}

impl<T: DeserializeOwned> Stored<T> {
    pub fn from_document(doc: &Document) -> Result<Self, DbError> {
        Ok(Stored {
            doc_id: doc.id.clone(),
            created_at: doc.created_at.clone(),
            updated_at: doc.updated_at.clone(),
            record: doc.decode()?,
        })
    }
}

/// Serialize a record into a document body.
pub fn to_body<T: Serialize>(record: &T) -> Result<Map<String, Value>, DbError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(DbError::NotAnObject),
    }
}
