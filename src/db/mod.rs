//! SQLite-backed document store for every console collection.
//!
//! The database lives at `~/.bizops/bizops.db` unless the config points
//! elsewhere. Each row of `documents` is one schema-less JSON document in a
//! named collection (`accounts`, `expenses`, `users`, ...). No shape is
//! enforced here; typed validation happens in the services layer.

use std::path::PathBuf;

use rusqlite::Connection;

mod documents;
mod imports;
pub mod live;
pub mod query;
pub mod store;
pub mod types;

pub use imports::DbImportRun;
pub use live::{decode_lossy, LiveQuery};
pub use query::{Filter, Op, Query};
pub use store::DocumentStore;
pub use types::*;

pub struct DocumentDb {
    conn: Connection,
}

impl DocumentDb {
    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Self) -> Result<T, DbError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL keeps the CLI's reads cheap while another process writes.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;
        log::debug!("Opened document store at {}", path.display());

        Ok(Self { conn })
    }

    /// Open a private in-memory database. Used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;
        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.bizops/bizops.db`.
    pub fn default_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".bizops").join("bizops.db"))
    }
}
