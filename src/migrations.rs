//! Schema migration framework.
//!
//! Numbered SQL migrations are embedded at compile time via `include_str!`.
//! Each migration runs exactly once, tracked by the `schema_version` table.

use rusqlite::Connection;

struct Migration {
    version: i32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("migrations/001_documents.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("migrations/002_import_runs.sql"),
    },
];

/// Create the `schema_version` table if it doesn't exist.
fn ensure_schema_version_table(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| format!("Failed to create schema_version table: {}", e))
}

/// Return the highest applied migration version, or 0 if none.
fn current_version(conn: &Connection) -> Result<i32, String> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Failed to read schema version: {}", e))
}

/// Back up the database before applying migrations to an existing schema.
///
/// Uses SQLite's online backup API to create a hot copy at
/// `<db_path>.pre-migration.bak`.
fn backup_before_migration(conn: &Connection) -> Result<(), String> {
    let db_path: String = conn
        .query_row("PRAGMA database_list", [], |row| row.get(2))
        .map_err(|e| format!("Failed to get database path: {}", e))?;

    if db_path.is_empty() || db_path == ":memory:" {
        return Ok(());
    }

    let backup_path = format!("{}.pre-migration.bak", db_path);
    let mut backup_conn = rusqlite::Connection::open(&backup_path)
        .map_err(|e| format!("Failed to open backup file: {}", e))?;

    let backup = rusqlite::backup::Backup::new(conn, &mut backup_conn)
        .map_err(|e| format!("Failed to initialize pre-migration backup: {}", e))?;

    backup
        .step(-1)
        .map_err(|e| format!("Pre-migration backup failed: {}", e))?;

    log::info!("Pre-migration backup created at {}", backup_path);
    Ok(())
}

/// Run all pending migrations.
///
/// Returns the number of migrations applied (0 if already up-to-date).
/// A database with a higher version than any known migration is refused.
pub fn run_migrations(conn: &Connection) -> Result<usize, String> {
    ensure_schema_version_table(conn)?;

    let current = current_version(conn)?;
    let max_known = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);

    if current > max_known {
        return Err(format!(
            "Database schema version ({}) is newer than this version of bizops supports ({}). \
             Please upgrade bizops.",
            current, max_known
        ));
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        return Ok(0);
    }

    // A fresh database has nothing worth copying.
    if current > 0 {
        backup_before_migration(conn)?;
    }

    for migration in &pending {
        conn.execute_batch(migration.sql)
            .map_err(|e| format!("Migration v{} failed: {}", migration.version, e))?;

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )
        .map_err(|e| format!("Failed to record migration v{}: {}", migration.version, e))?;

        log::info!("Applied migration v{}", migration.version);
    }

    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn mem_db() -> Connection {
        Connection::open_in_memory().expect("in-memory db")
    }

    #[test]
    fn test_fresh_db_applies_all() {
        let conn = mem_db();
        let applied = run_migrations(&conn).expect("migrations should succeed");
        assert_eq!(applied, MIGRATIONS.len());

        let version = current_version(&conn).expect("version query");
        assert_eq!(version, 2);

        conn.execute(
            "INSERT INTO documents (collection, id, data, created_at, updated_at)
             VALUES ('accounts', 'd1', '{}', '2026-01-01', '2026-01-01')",
            [],
        )
        .expect("documents table should exist");

        conn.execute(
            "INSERT INTO import_runs (id, entity, source_path, row_count, imported_by, created_at)
             VALUES ('r1', 'accounts', '/tmp/a.csv', 3, 'ops@example.com', '2026-01-01')",
            [],
        )
        .expect("import_runs table should exist");
    }

    #[test]
    fn test_forward_compat_guard() {
        let conn = mem_db();
        ensure_schema_version_table(&conn).expect("table");
        conn.execute("INSERT INTO schema_version (version) VALUES (999)", [])
            .expect("insert");

        let err = run_migrations(&conn).expect_err("should refuse newer schema");
        assert!(
            err.contains("newer than this version"),
            "error should mention version mismatch: {}",
            err
        );
    }

    #[test]
    fn test_idempotency() {
        let conn = mem_db();
        assert_eq!(run_migrations(&conn).expect("first run"), 2);
        assert_eq!(run_migrations(&conn).expect("second run"), 0);
        assert_eq!(current_version(&conn).expect("version"), 2);
    }

    #[test]
    fn test_backup_created_when_upgrading_existing_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("upgrade.db");

        let conn = Connection::open(&db_path).expect("open db");
        ensure_schema_version_table(&conn).expect("table");
        conn.execute_batch(MIGRATIONS[0].sql).expect("v1 schema");
        conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])
            .expect("mark v1");

        let applied = run_migrations(&conn).expect("upgrade");
        assert_eq!(applied, 1);

        let backup_path = dir.path().join("upgrade.db.pre-migration.bak");
        assert!(
            backup_path.exists(),
            "pre-migration backup should be created at {}",
            backup_path.display()
        );
    }

    #[test]
    fn test_fresh_file_db_skips_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("fresh.db");
        let conn = Connection::open(&db_path).expect("open db");
        run_migrations(&conn).expect("migrate");
        assert!(!dir.path().join("fresh.db.pre-migration.bak").exists());
    }
}
