//! Operator commands. Each takes the shared state and the caller's session
//! and returns something serializable for the front end to print.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::{IdentityProvider, Session};
use crate::db::{DbImportRun, Document, Stored};
use crate::entity::EntityKind;
use crate::error::ConsoleError;
use crate::models::UserProfile;
use crate::permissions::{Access, Affordances, Feature};
use crate::services::{dashboard, roles, ServiceContext};
use crate::spreadsheet::{self, ImportSummary};
use crate::state::AppState;

/// Sign in through `provider` against the state's store.
pub fn sign_in(state: &AppState, provider: &dyn IdentityProvider) -> Result<Session, ConsoleError> {
    Session::establish(provider, &state.store)
}

fn document_json(doc: &Document) -> Value {
    let mut map = Map::new();
    map.insert("docId".to_string(), Value::String(doc.id.clone()));
    map.extend(doc.data.clone());
    Value::Object(map)
}

/// Every document of `kind`, as stored.
pub fn list_collection(
    state: &AppState,
    session: &Session,
    kind: EntityKind,
) -> Result<Vec<Value>, ConsoleError> {
    session.require(kind.feature(), Access::Read)?;
    let docs = state.store.list(kind.collection())?;
    Ok(docs.iter().map(document_json).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    Finance,
    Marketing,
    Sales,
}

pub fn get_dashboard(
    state: &AppState,
    session: &Session,
    which: DashboardKind,
) -> Result<Value, ConsoleError> {
    let ctx = ServiceContext::from_state(state, session);
    let value = match which {
        DashboardKind::Finance => serde_json::to_value(dashboard::financial_overview(&ctx)?),
        DashboardKind::Marketing => serde_json::to_value(dashboard::marketing(&ctx)?),
        DashboardKind::Sales => serde_json::to_value(dashboard::sales(&ctx)?),
    };
    value.map_err(|e| ConsoleError::Store(e.into()))
}

pub fn import_spreadsheet(
    state: &AppState,
    session: &Session,
    kind: EntityKind,
    path: &Path,
) -> Result<ImportSummary, ConsoleError> {
    let ctx = ServiceContext::from_state(state, session);
    spreadsheet::import_file(&ctx, kind, path)
}

pub fn export_spreadsheet(
    state: &AppState,
    session: &Session,
    kind: EntityKind,
    path: &Path,
) -> Result<usize, ConsoleError> {
    let ctx = ServiceContext::from_state(state, session);
    spreadsheet::export_csv(&ctx, kind, path)
}

pub fn assign_role(
    state: &AppState,
    session: &Session,
    email: &str,
    role_id: &str,
) -> Result<Stored<UserProfile>, ConsoleError> {
    let ctx = ServiceContext::from_state(state, session);
    roles::assign_role(&ctx, email, role_id)
}

/// Bootstrap helper: no session needed.
pub fn grant_permission(
    state: &AppState,
    email: &str,
    permission: &str,
) -> Result<Stored<UserProfile>, ConsoleError> {
    roles::grant(&state.store, email, permission)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenAccess {
    pub feature: Feature,
    pub affordances: Affordances,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub email: String,
    pub screens: Vec<ScreenAccess>,
}

/// The signed-in user and what each visible screen lets them do.
pub fn whoami(session: &Session) -> WhoAmI {
    let screens = session
        .permissions()
        .visible_features()
        .into_iter()
        .map(|feature| {
            let deletable = EntityKind::ALL
                .into_iter()
                .any(|k| k.feature() == feature && k.supports_delete());
            ScreenAccess {
                feature,
                affordances: session.permissions().affordances(feature, deletable),
            }
        })
        .collect();
    WhoAmI {
        email: session.user().email.clone(),
        screens,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub collections: Vec<(String, i64)>,
    pub recent_imports: Vec<DbImportRun>,
}

pub fn store_status(state: &AppState) -> Result<StoreStatus, ConsoleError> {
    Ok(StoreStatus {
        collections: state.store.collection_counts()?,
        recent_imports: state.store.recent_imports(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticIdentity;
    use crate::types::Config;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("tempdir");
        let state =
            AppState::in_memory(Config::default(), dir.path().join("config.json")).expect("state");
        (dir, state)
    }

    #[test]
    fn test_bootstrap_then_list() {
        let (_dir, state) = state();
        grant_permission(&state, "boss@example.com", "Accounts:full access").expect("grant");
        let identity = StaticIdentity::signed_in("boss@example.com");
        let session = sign_in(&state, &identity).expect("session");

        assert!(list_collection(&state, &session, EntityKind::Account).expect("list").is_empty());
        assert!(matches!(
            list_collection(&state, &session, EntityKind::Deal),
            Err(ConsoleError::PermissionDenied { .. })
        ));

        let me = whoami(&session);
        assert_eq!(me.screens.len(), 1);
        assert!(me.screens[0].affordances.can_edit);
        assert!(!me.screens[0].affordances.can_delete);
    }

    #[test]
    fn test_dashboard_requires_permission() {
        let (_dir, state) = state();
        let session = Session::with_roles("m@example.com", &["Marketing:read"]);
        let value = get_dashboard(&state, &session, DashboardKind::Marketing).expect("marketing");
        assert_eq!(value["totalLeads"], 0);
        assert!(get_dashboard(&state, &session, DashboardKind::Finance).is_err());
    }

    #[test]
    fn test_store_status_counts_users() {
        let (_dir, state) = state();
        grant_permission(&state, "a@example.com", "Deals:read").expect("grant");
        let status = store_status(&state).expect("status");
        assert_eq!(status.collections, vec![("users".to_string(), 1)]);
    }
}
