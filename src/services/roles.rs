//! Roles screen: copying a role's permissions onto a user's profile.

use serde_json::{Map, Value};

use super::{crud, ServiceContext};
use crate::auth::load_profile;
use crate::db::{to_body, DocumentStore, Stored};
use crate::error::ConsoleError;
use crate::models::{Role, UserProfile};
use crate::permissions::{parse_role, role_string, Access, Feature};

/// Add `roles` to the profile for `email`, creating the profile if needed.
fn add_roles(
    store: &DocumentStore,
    email: &str,
    roles: &[String],
) -> Result<Stored<UserProfile>, ConsoleError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ConsoleError::validation("email", "is required"));
    }

    let doc = match load_profile(store, &email)? {
        Some(mut existing) => {
            let added = existing.record.grant(roles);
            log::info!("Granted {} new role(s) to {}", added, email);
            let mut fields = Map::new();
            fields.insert(
                "roles".to_string(),
                Value::Array(existing.record.roles.into_iter().map(Value::String).collect()),
            );
            store.merge(UserProfile::COLLECTION, &existing.doc_id, fields)?
        }
        None => {
            let mut profile = UserProfile::new(&email);
            profile.grant(roles);
            log::info!("Created profile for {} with {} role(s)", email, profile.roles.len());
            store.put(UserProfile::COLLECTION, &email, to_body(&profile)?)?
        }
    };
    Ok(Stored::from_document(&doc)?)
}

/// Give the user every permission listed on role `role_id`.
pub fn assign_role(
    ctx: &ServiceContext<'_>,
    email: &str,
    role_id: &str,
) -> Result<Stored<UserProfile>, ConsoleError> {
    ctx.session.require(Feature::Roles, Access::FullAccess)?;
    let role = crud::get::<Role>(ctx, role_id)?.record;
    add_roles(ctx.store, email, &role.permissions)
}

/// Write a single permission string onto a profile without a session check.
/// Used to bootstrap the first administrator from the command line.
pub fn grant(
    store: &DocumentStore,
    email: &str,
    permission: &str,
) -> Result<Stored<UserProfile>, ConsoleError> {
    let (feature, access) = parse_role(permission).ok_or_else(|| {
        let message = format!("'{}' is not a known permission", permission);
        ConsoleError::validation("permission", message)
    })?;
    add_roles(store, email, &[role_string(feature, access)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Session, StaticIdentity};
    use crate::models::RoleForm;
    use crate::services::test_support::{admin, store};

    #[test]
    fn test_assign_role_creates_then_merges_profile() {
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        let sales = crud::create(
            &ctx,
            &RoleForm {
                name: "Sales".into(),
                permissions: "deals: full access, leads:read".into(),
                ..Default::default()
            },
        )
        .expect("role");
        let marketing = crud::create(
            &ctx,
            &RoleForm {
                name: "Marketing".into(),
                permissions: "Campaigns:full access, Leads:read".into(),
                ..Default::default()
            },
        )
        .expect("role");

        assign_role(&ctx, "rep@example.com", &sales.record.role_id).expect("first");
        let profile =
            assign_role(&ctx, "Rep@Example.com", &marketing.record.role_id).expect("second");
        assert_eq!(
            profile.record.roles,
            vec!["Deals:full access", "Leads:read", "Campaigns:full access"]
        );
        assert_eq!(store.list("users").expect("users").len(), 1);

        let identity = StaticIdentity::signed_in("rep@example.com");
        let rep = Session::establish(&identity, &store).expect("session");
        assert!(rep.require(Feature::Campaigns, Access::FullAccess).is_ok());
        assert!(rep.require(Feature::Leads, Access::FullAccess).is_err());
    }

    #[test]
    fn test_grant_rejects_unknown_permission() {
        let store = store();
        assert!(grant(&store, "a@example.com", "Payroll:read").is_err());
        let profile = grant(&store, "a@example.com", "roles : Full Access").expect("grant");
        assert_eq!(profile.record.roles, vec!["Roles:full access"]);
    }
}
