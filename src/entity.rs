//! Entity kinds tracked by the console.
//!
//! Each kind names its collection, its human-readable id pattern and field,
//! the feature that gates it, and whether its records may be deleted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ids::IdPattern;
use crate::permissions::Feature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Client,
    Employee,
    Role,
    Project,
    Expense,
    Earning,
    Lead,
    Campaign,
    Deal,
    Team,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Account,
        EntityKind::Client,
        EntityKind::Employee,
        EntityKind::Role,
        EntityKind::Project,
        EntityKind::Expense,
        EntityKind::Earning,
        EntityKind::Lead,
        EntityKind::Campaign,
        EntityKind::Deal,
        EntityKind::Team,
    ];

    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Account => "accounts",
            EntityKind::Client => "clients",
            EntityKind::Employee => "employees",
            EntityKind::Role => "roles",
            EntityKind::Project => "projects",
            EntityKind::Expense => "expenses",
            EntityKind::Earning => "earnings",
            EntityKind::Lead => "leads",
            EntityKind::Campaign => "campaigns",
            EntityKind::Deal => "deals",
            EntityKind::Team => "teams",
        }
    }

    /// Field holding the human-readable id.
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::Account => "accountId",
            EntityKind::Client => "clientId",
            EntityKind::Employee => "employeeId",
            EntityKind::Role => "roleId",
            EntityKind::Project => "projectId",
            EntityKind::Expense => "expenseId",
            EntityKind::Earning => "earningId",
            EntityKind::Lead => "leadId",
            EntityKind::Campaign => "campaignId",
            EntityKind::Deal => "dealId",
            EntityKind::Team => "teamId",
        }
    }

    pub fn id_pattern(&self) -> IdPattern {
        match self {
            EntityKind::Account => IdPattern::new("ACC", 4),
            EntityKind::Client => IdPattern::new("CL", 3),
            EntityKind::Employee => IdPattern::new("EMP", 4),
            EntityKind::Role => IdPattern::new("ROLE", 3),
            EntityKind::Project => IdPattern::new("PRJ", 4),
            EntityKind::Expense => IdPattern::new("EXP", 4),
            EntityKind::Earning => IdPattern::new("ERN", 4),
            EntityKind::Lead => IdPattern::new("LD", 4),
            EntityKind::Campaign => IdPattern::new("CMP", 4),
            EntityKind::Deal => IdPattern::new("DL", 4),
            EntityKind::Team => IdPattern::new("TM", 3),
        }
    }

    pub fn feature(&self) -> Feature {
        match self {
            EntityKind::Account => Feature::Accounts,
            EntityKind::Client => Feature::Clients,
            EntityKind::Employee => Feature::Employees,
            EntityKind::Role => Feature::Roles,
            EntityKind::Project => Feature::Projects,
            EntityKind::Expense => Feature::Expenses,
            EntityKind::Earning => Feature::Earnings,
            EntityKind::Lead => Feature::Leads,
            EntityKind::Campaign => Feature::Campaigns,
            EntityKind::Deal => Feature::Deals,
            EntityKind::Team => Feature::Teams,
        }
    }

    /// Only these kinds expose a delete action.
    pub fn supports_delete(&self) -> bool {
        matches!(
            self,
            EntityKind::Expense
                | EntityKind::Project
                | EntityKind::Role
                | EntityKind::Lead
                | EntityKind::Campaign
                | EntityKind::Deal
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Account => "Account",
            EntityKind::Client => "Client",
            EntityKind::Employee => "Employee",
            EntityKind::Role => "Role",
            EntityKind::Project => "Project",
            EntityKind::Expense => "Expense",
            EntityKind::Earning => "Earning",
            EntityKind::Lead => "Lead",
            EntityKind::Campaign => "Campaign",
            EntityKind::Deal => "Deal",
            EntityKind::Team => "Team",
        }
    }

    /// Parse a collection name or singular label.
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.collection() == key || k.label().to_lowercase() == key)
    }
}

/// A typed record stored in one collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn human_id(&self) -> &str;
    fn set_human_id(&mut self, id: String);

    /// Name shown when another record references this one.
    fn display_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_collection_and_label() {
        assert_eq!(EntityKind::parse("accounts"), Some(EntityKind::Account));
        assert_eq!(EntityKind::parse("Deal"), Some(EntityKind::Deal));
        assert_eq!(EntityKind::parse("widgets"), None);
    }

    #[test]
    fn test_delete_support_matches_screens() {
        let deletable: Vec<EntityKind> = EntityKind::ALL
            .into_iter()
            .filter(EntityKind::supports_delete)
            .collect();
        assert_eq!(
            deletable,
            vec![
                EntityKind::Role,
                EntityKind::Project,
                EntityKind::Expense,
                EntityKind::Lead,
                EntityKind::Campaign,
                EntityKind::Deal,
            ]
        );
    }

    #[test]
    fn test_id_patterns_are_distinct() {
        let mut prefixes: Vec<&str> = EntityKind::ALL
            .iter()
            .map(|k| k.id_pattern().prefix)
            .collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), EntityKind::ALL.len());
    }
}
