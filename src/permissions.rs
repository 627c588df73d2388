//! Feature permissions parsed from a user's `roles` array.
//!
//! Role strings follow `"<Feature>:read"` (view only) and
//! `"<Feature>:full access"` (view, create, edit, delete). Matching ignores
//! case and surrounding whitespace. Unknown features are ignored.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A gated feature area of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Accounts,
    Clients,
    Employees,
    Roles,
    Projects,
    Expenses,
    Earnings,
    Leads,
    Campaigns,
    Deals,
    Teams,
    FinancialOverview,
    Marketing,
    Sales,
}

impl Feature {
    pub const ALL: [Feature; 14] = [
        Feature::Accounts,
        Feature::Clients,
        Feature::Employees,
        Feature::Roles,
        Feature::Projects,
        Feature::Expenses,
        Feature::Earnings,
        Feature::Leads,
        Feature::Campaigns,
        Feature::Deals,
        Feature::Teams,
        Feature::FinancialOverview,
        Feature::Marketing,
        Feature::Sales,
    ];

    /// The name used in role strings.
    pub fn label(&self) -> &'static str {
        match self {
            Feature::Accounts => "Accounts",
            Feature::Clients => "Clients",
            Feature::Employees => "Employees",
            Feature::Roles => "Roles",
            Feature::Projects => "Projects",
            Feature::Expenses => "Expenses",
            Feature::Earnings => "Earnings",
            Feature::Leads => "Leads",
            Feature::Campaigns => "Campaigns",
            Feature::Deals => "Deals",
            Feature::Teams => "Teams",
            Feature::FinancialOverview => "Financial Overview",
            Feature::Marketing => "Marketing",
            Feature::Sales => "Sales",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let key = normalize(label);
        Feature::ALL
            .into_iter()
            .find(|f| normalize(f.label()) == key)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Access level, ordered so `FullAccess` implies `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    None,
    Read,
    FullAccess,
}

impl Access {
    pub fn label(&self) -> &'static str {
        match self {
            Access::None => "none",
            Access::Read => "read",
            Access::FullAccess => "full access",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match normalize(label).as_str() {
            "read" => Some(Access::Read),
            "fullaccess" => Some(Access::FullAccess),
            _ => None,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format a role string for a feature and access level.
pub fn role_string(feature: Feature, access: Access) -> String {
    format!("{}:{}", feature.label(), access.label())
}

/// Parse one role string into its feature and access.
pub fn parse_role(role: &str) -> Option<(Feature, Access)> {
    let (feature, access) = role.split_once(':')?;
    let feature = Feature::from_label(feature)?;
    let access = Access::from_label(access)?;
    Some((feature, access))
}

/// Effective permissions: the highest access granted per feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Permissions {
    grants: HashMap<Feature, Access>,
}

impl Permissions {
    pub fn from_roles<S: AsRef<str>>(roles: &[S]) -> Self {
        let mut grants: HashMap<Feature, Access> = HashMap::new();
        for role in roles {
            match parse_role(role.as_ref()) {
                Some((feature, access)) => {
                    let entry = grants.entry(feature).or_insert(Access::None);
                    if access > *entry {
                        *entry = access;
                    }
                }
                None => log::debug!("Ignoring unrecognised role '{}'", role.as_ref()),
            }
        }
        Permissions { grants }
    }

    pub fn access(&self, feature: Feature) -> Access {
        self.grants.get(&feature).copied().unwrap_or(Access::None)
    }

    pub fn allows(&self, feature: Feature, needed: Access) -> bool {
        self.access(feature) >= needed
    }

    /// UI affordances for a feature. `deletable` says whether the feature's
    /// records support delete at all.
    pub fn affordances(&self, feature: Feature, deletable: bool) -> Affordances {
        let access = self.access(feature);
        let full = access == Access::FullAccess;
        Affordances {
            can_view: access >= Access::Read,
            can_create: full,
            can_edit: full,
            can_delete: full && deletable,
        }
    }

    /// Features the user can see at all, in menu order.
    pub fn visible_features(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.allows(*f, Access::Read))
            .collect()
    }
}

/// Which actions a screen should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordances {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
