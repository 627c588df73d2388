use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::columns::{import_fields, map_columns, unmapped_headers};
use super::read_sheet;
use crate::db::to_body;
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::ids::{RandomSuffix, SuffixSource};
use crate::models::{AccountForm, ClientForm, EmployeeForm, EntityForm};
use crate::permissions::Access;
use crate::services::ServiceContext;

/// Outcome of a successful import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub entity: EntityKind,
    pub import_id: String,
    pub imported: usize,
    pub ids: Vec<String>,
    pub unmapped_columns: Vec<String>,
}

/// Import `path` as records of `kind`.
pub fn import_file(
    ctx: &ServiceContext<'_>,
    kind: EntityKind,
    path: &Path,
) -> Result<ImportSummary, ConsoleError> {
    import_file_with(ctx, kind, path, &mut RandomSuffix)
}

pub fn import_file_with(
    ctx: &ServiceContext<'_>,
    kind: EntityKind,
    path: &Path,
    source: &mut dyn SuffixSource,
) -> Result<ImportSummary, ConsoleError> {
    match kind {
        EntityKind::Account => import_rows::<AccountForm>(ctx, path, source),
        EntityKind::Client => import_rows::<ClientForm>(ctx, path, source),
        EntityKind::Employee => import_rows::<EmployeeForm>(ctx, path, source),
        other => Err(ConsoleError::UnsupportedOperation(format!(
            "{} records cannot be imported",
            other.label()
        ))),
    }
}

/// Validate every row, then write the whole batch in one transaction.
/// The first invalid row aborts the import and nothing is written.
fn import_rows<F>(
    ctx: &ServiceContext<'_>,
    path: &Path,
    source: &mut dyn SuffixSource,
) -> Result<ImportSummary, ConsoleError>
where
    F: EntityForm + DeserializeOwned,
{
    let kind = <F::Record as Entity>::KIND;
    ctx.session.require(kind.feature(), Access::FullAccess)?;
    let fields = import_fields(kind).ok_or_else(|| {
        ConsoleError::UnsupportedOperation(format!("{} records cannot be imported", kind.label()))
    })?;

    let sheet = read_sheet(path)?;
    let mapping = map_columns(&sheet.headers, fields);
    let unmapped_columns = unmapped_headers(&sheet.headers, &mapping);
    if !unmapped_columns.is_empty() {
        log::warn!(
            "Ignoring unrecognised columns in {}: {}",
            path.display(),
            unmapped_columns.join(", ")
        );
    }

    let mut taken: HashSet<String> = ctx
        .store
        .list(kind.collection())?
        .iter()
        .filter_map(|doc| doc.get_str(kind.id_field()).map(str::to_string))
        .collect();

    let mut ids = Vec::with_capacity(sheet.rows.len());
    let mut bodies = Vec::with_capacity(sheet.rows.len());
    for (row, cells) in &sheet.rows {
        let at_row = |err: ConsoleError| ConsoleError::ImportRow {
            row: *row,
            source: Box::new(err),
        };

        let mut raw = Map::new();
        for (field, &col) in &mapping {
            let value = cells.get(col).cloned().unwrap_or_default();
            raw.insert(field.to_string(), Value::String(value));
        }
        let form: F = serde_json::from_value(Value::Object(raw))
            .map_err(|e| at_row(ConsoleError::validation("row", e.to_string())))?;
        let mut record = form.validate().map_err(at_row)?;

        let id = ctx
            .ids
            .generate_unique_in(kind.id_pattern(), source, &mut taken)
            .map_err(at_row)?;
        record.set_human_id(id.clone());
        bodies.push(to_body(&record)?);
        ids.push(id);
    }

    let (_, run) = ctx.store.import_batch(
        kind.collection(),
        bodies,
        &path.display().to_string(),
        &ctx.session.user().email,
    )?;
    log::info!(
        "Imported {} {} record(s) from {} ({})",
        ids.len(),
        kind.label(),
        path.display(),
        run.id
    );

    Ok(ImportSummary {
        entity: kind,
        import_id: run.id,
        imported: ids.len(),
        ids,
        unmapped_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Client;
    use crate::permissions::Feature;
    use crate::services::crud;
    use crate::services::test_support::{admin, reader, store};

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).expect("write");
        path
    }

    #[test]
    fn test_imports_clients_with_loose_headers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            "clients.csv",
            "Client Name,E-mail Address,Phone Number,Favourite Colour\n\
             Acme,ops@acme.test,555-0100,red\n\
             Globex,,555-0199,blue\n",
        );
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        let summary = import_file(&ctx, EntityKind::Client, &path).expect("import");
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.unmapped_columns, vec!["Favourite Colour"]);

        let clients = crud::list::<Client>(&ctx).expect("list");
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].record.email.as_deref(), Some("ops@acme.test"));
        assert!(clients.iter().all(|c| c.record.client_id.starts_with("CL-")));
        assert_eq!(store.recent_imports(5).expect("runs")[0].row_count, 2);
    }

    #[test]
    fn test_missing_required_field_aborts_whole_import() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            "accounts.csv",
            "Name,Balance\nOperating,100\n,250\nSavings,50\n",
        );
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        let err = import_file(&ctx, EntityKind::Account, &path).expect_err("row 3 invalid");
        match err {
            ConsoleError::ImportRow { row, source } => {
                assert_eq!(row, 3);
                assert!(matches!(
                    *source,
                    ConsoleError::Validation { ref field, .. } if field == "name"
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.list("accounts").expect("list").is_empty());
        assert!(store.recent_imports(5).expect("runs").is_empty());
    }

    #[test]
    fn test_error_row_counts_blank_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "accounts.csv", "Name,Balance\nOperating,100\n\n,250\n");
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        let err = import_file(&ctx, EntityKind::Account, &path).expect_err("row 4 invalid");
        assert!(matches!(err, ConsoleError::ImportRow { row: 4, .. }));
        assert!(store.list("accounts").expect("list").is_empty());
    }

    #[test]
    fn test_import_requires_full_access() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "clients.csv", "Name\nAcme\n");
        let store = store();
        let session = reader(Feature::Clients);
        let ctx = ServiceContext::new(&store, &session);
        assert!(matches!(
            import_file(&ctx, EntityKind::Client, &path),
            Err(ConsoleError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_unsupported_kind() {
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);
        assert!(matches!(
            import_file(&ctx, EntityKind::Deal, Path::new("deals.csv")),
            Err(ConsoleError::UnsupportedOperation(_))
        ));
    }
}
