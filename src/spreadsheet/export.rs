use std::path::Path;

use serde_json::Value;

use super::sheet_error;
use crate::db::Document;
use crate::entity::EntityKind;
use crate::error::ConsoleError;
use crate::permissions::Access;
use crate::services::ServiceContext;

/// Column order for each exported kind. The id column always comes first.
pub fn export_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Account => &[
            "accountId", "name", "accountType", "balance", "clientId", "status", "openedOn",
            "notes",
        ],
        EntityKind::Client => &[
            "clientId", "name", "email", "phone", "company", "address", "accountId", "status",
        ],
        EntityKind::Employee => &[
            "employeeId", "name", "email", "phone", "position", "department", "salary", "teamId",
            "hireDate", "salesQuota", "status",
        ],
        EntityKind::Role => &["roleId", "name", "description", "permissions"],
        EntityKind::Project => &[
            "projectId", "name", "clientId", "accountId", "teamId", "budget", "startDate",
            "endDate", "status", "description",
        ],
        EntityKind::Expense => &[
            "expenseId", "accountId", "projectId", "category", "amount", "date", "vendor",
            "description",
        ],
        EntityKind::Earning => &[
            "earningId", "accountId", "projectId", "source", "amount", "date", "description",
        ],
        EntityKind::Lead => &[
            "leadId", "name", "email", "company", "source", "campaignId", "status",
            "estimatedValue", "createdOn", "convertedOn",
        ],
        EntityKind::Campaign => &[
            "campaignId", "name", "channel", "budget", "spent", "revenue", "startDate", "endDate",
            "status",
        ],
        EntityKind::Deal => &[
            "dealId", "title", "clientId", "ownerId", "value", "stage", "createdOn",
            "expectedClose", "closedOn",
        ],
        EntityKind::Team => &["teamId", "name", "leaderId", "memberIds", "salesQuota"],
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| cell(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn row(doc: &Document, columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| cell(doc.data.get(*c))).collect()
}

/// Write every record of `kind` to a CSV file. Returns the number of rows.
pub fn export_csv(
    ctx: &ServiceContext<'_>,
    kind: EntityKind,
    path: &Path,
) -> Result<usize, ConsoleError> {
    ctx.session.require(kind.feature(), Access::Read)?;
    let docs = ctx.store.list(kind.collection())?;
    let columns = export_columns(kind);

    let mut writer = csv::Writer::from_path(path).map_err(|e| sheet_error(path, e))?;
    writer.write_record(columns).map_err(|e| sheet_error(path, e))?;
    for doc in &docs {
        writer.write_record(row(doc, columns)).map_err(|e| sheet_error(path, e))?;
    }
    writer.flush()?;

    log::info!("Exported {} {} record(s) to {}", docs.len(), kind.label(), path.display());
    Ok(docs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientForm, TeamForm};
    use crate::services::crud;
    use crate::services::test_support::{admin, store};
    use crate::spreadsheet::import_file;

    #[test]
    fn test_export_then_reimport_clients() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("clients.csv");
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        crud::create(
            &ctx,
            &ClientForm {
                name: "Acme, Inc.".into(),
                email: "ops@acme.test".into(),
                ..Default::default()
            },
        )
        .expect("client");

        assert_eq!(export_csv(&ctx, EntityKind::Client, &path).expect("export"), 1);
        let text = std::fs::read_to_string(&path).expect("read");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("clientId,name,email,phone,company,address,accountId,status")
        );
        assert!(lines.next().expect("row").contains("\"Acme, Inc.\",ops@acme.test,,,,,Active"));

        // The id column is ignored on import; a fresh id is generated.
        let summary = import_file(&ctx, EntityKind::Client, &path).expect("reimport");
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.unmapped_columns, vec!["clientId"]);
    }

    #[test]
    fn test_list_columns_join() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("teams.csv");
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        crud::create(
            &ctx,
            &TeamForm {
                name: "EMEA".into(),
                member_ids: "EMP-1000;EMP-1001".into(),
                ..Default::default()
            },
        )
        .expect("team");
        export_csv(&ctx, EntityKind::Team, &path).expect("export");
        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.contains("\"EMP-1000, EMP-1001\""));
    }
}
