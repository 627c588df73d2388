//! Signed-in user and the permission set loaded from their profile document.

use crate::db::{DocumentStore, Filter, Query, Stored};
use crate::entity::EntityKind;
use crate::error::ConsoleError;
use crate::models::UserProfile;
use crate::permissions::{Access, Affordances, Feature, Permissions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub token: Option<String>,
}

/// Source of the currently signed-in user.
pub trait IdentityProvider {
    fn current_user(&self) -> Option<AuthUser>;
}

/// Identity fixed at construction; backs the CLI's `--as` flag.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Option<AuthUser>,
}

impl StaticIdentity {
    pub fn signed_in(email: &str) -> Self {
        let email = email.trim().to_lowercase();
        StaticIdentity {
            user: Some(AuthUser {
                uid: format!("local:{}", email),
                email,
                token: None,
            }),
        }
    }

    pub fn signed_out() -> Self {
        StaticIdentity { user: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<AuthUser> {
        self.user.clone()
    }
}

/// Look up the profile document for `email`.
pub fn load_profile(
    store: &DocumentStore,
    email: &str,
) -> Result<Option<Stored<UserProfile>>, ConsoleError> {
    let query = Query::collection(UserProfile::COLLECTION)
        .filter(Filter::eq("email", email.trim().to_lowercase()));
    match store.find_one(&query)? {
        Some(doc) => Ok(Some(Stored::from_document(&doc)?)),
        None => Ok(None),
    }
}

/// A signed-in user plus their effective permissions.
#[derive(Debug, Clone)]
pub struct Session {
    user: AuthUser,
    permissions: Permissions,
}

impl Session {
    /// Resolve the signed-in user and read their roles.
    ///
    /// A user without a profile document gets no permissions.
    pub fn establish(
        provider: &dyn IdentityProvider,
        store: &DocumentStore,
    ) -> Result<Self, ConsoleError> {
        let user = provider.current_user().ok_or(ConsoleError::NotAuthenticated)?;
        let permissions = match load_profile(store, &user.email)? {
            Some(profile) => Permissions::from_roles(&profile.record.roles),
            None => {
                log::info!("No profile for {}; no permissions granted", user.email);
                Permissions::default()
            }
        };
        Ok(Session { user, permissions })
    }

    /// Session with an explicit role list, bypassing the profile lookup.
    pub fn with_roles<S: AsRef<str>>(email: &str, roles: &[S]) -> Self {
        let email = email.trim().to_lowercase();
        let user = AuthUser {
            uid: format!("local:{}", email),
            email,
            token: None,
        };
        Session {
            user,
            permissions: Permissions::from_roles(roles),
        }
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn require(&self, feature: Feature, needed: Access) -> Result<(), ConsoleError> {
        if self.permissions.allows(feature, needed) {
            Ok(())
        } else {
            log::warn!("{} denied {} on {}", self.user.email, needed, feature);
            Err(ConsoleError::PermissionDenied { feature, needed })
        }
    }

    /// Actions to offer on the screen for `kind`.
    pub fn affordances(&self, kind: EntityKind) -> Affordances {
        self.permissions.affordances(kind.feature(), kind.supports_delete())
    }
}
