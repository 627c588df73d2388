use serde::{Deserialize, Serialize};

use super::EntityForm;
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::permissions::{parse_role, role_string};
use crate::validation;

/// A named bundle of permission strings in the `roles` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Role {
    pub role_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl Entity for Role {
    const KIND: EntityKind = EntityKind::Role;

    fn human_id(&self) -> &str {
        &self.role_id
    }

    fn set_human_id(&mut self, id: String) {
        self.role_id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleForm {
    pub name: String,
    pub description: String,
    /// Comma separated, e.g. `"Deals:read, Leads:full access"`.
    pub permissions: String,
}

impl EntityForm for RoleForm {
    type Record = Role;

    fn validate(&self) -> Result<Role, ConsoleError> {
        let mut permissions = Vec::new();
        for raw in validation::list(&self.permissions) {
            let (feature, access) = parse_role(&raw).ok_or_else(|| {
                ConsoleError::validation(
                    "permissions",
                    format!(
                        "'{}' is not of the form '<Feature>:read' or '<Feature>:full access'",
                        raw
                    ),
                )
            })?;
            let canonical = role_string(feature, access);
            if !permissions.contains(&canonical) {
                permissions.push(canonical);
            }
        }
        Ok(Role {
            role_id: String::new(),
            name: validation::required("name", &self.name)?,
            description: validation::optional(&self.description),
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_are_canonicalized_and_deduped() {
        let form = RoleForm {
            name: "Sales rep".to_string(),
            permissions: "deals:FULL ACCESS, Leads:read, Deals:full access".to_string(),
            ..Default::default()
        };
        let role = form.validate().expect("valid");
        assert_eq!(role.permissions, vec!["Deals:full access", "Leads:read"]);
    }

    #[test]
    fn test_unknown_permission_rejected() {
        let form = RoleForm {
            name: "Odd".to_string(),
            permissions: "Payroll:read".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_err());
    }
}
