use chrono::Utc;
use rusqlite::params;
use serde::Serialize;
use uuid::Uuid;

use super::*;

/// A row from the `import_runs` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbImportRun {
    pub id: String,
    pub entity: String,
    pub source_path: String,
    pub row_count: i64,
    pub imported_by: String,
    pub created_at: String,
}

impl DocumentDb {
    // =========================================================================
    // Import history
    // =========================================================================

    pub fn insert_import_run(
        &self,
        entity: &str,
        source_path: &str,
        row_count: usize,
        imported_by: &str,
    ) -> Result<DbImportRun, DbError> {
        let run = DbImportRun {
            id: format!("imp-{}", Uuid::new_v4()),
            entity: entity.to_string(),
            source_path: source_path.to_string(),
            row_count: row_count as i64,
            imported_by: imported_by.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.conn.execute(
            "INSERT INTO import_runs (id, entity, source_path, row_count, imported_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run.id,
                run.entity,
                run.source_path,
                run.row_count,
                run.imported_by,
                run.created_at,
            ],
        )?;
        Ok(run)
    }

    /// Most recent imports first.
    pub fn recent_import_runs(&self, limit: usize) -> Result<Vec<DbImportRun>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, entity, source_path, row_count, imported_by, created_at
             FROM import_runs ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(DbImportRun {
                id: row.get(0)?,
                entity: row.get(1)?,
                source_path: row.get(2)?,
                row_count: row.get(3)?,
                imported_by: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_runs_newest_first() {
        let db = DocumentDb::open_in_memory().expect("db");
        db.insert_import_run("accounts", "/tmp/a.csv", 3, "ops@example.com")
            .expect("first");
        db.insert_import_run("clients", "/tmp/c.xlsx", 5, "ops@example.com")
            .expect("second");
        let runs = db.recent_import_runs(10).expect("runs");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].entity, "clients");
        assert_eq!(runs[1].row_count, 3);
    }
}
