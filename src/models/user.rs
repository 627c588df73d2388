use serde::{Deserialize, Serialize};

/// Per-user document in the `users` collection, keyed by email. Carries the
/// role strings that gate every screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub roles: Vec<String>,
}

impl UserProfile {
    pub const COLLECTION: &'static str = "users";

    pub fn new(email: &str) -> Self {
        UserProfile {
            email: email.trim().to_lowercase(),
            display_name: None,
            roles: Vec::new(),
        }
    }

    /// Add role strings not already present. Returns how many were added.
    pub fn grant<S: AsRef<str>>(&mut self, roles: &[S]) -> usize {
        let mut added = 0;
        for role in roles {
            let role = role.as_ref().trim();
            if role.is_empty() || self.roles.iter().any(|r| r.eq_ignore_ascii_case(role)) {
                continue;
            }
            self.roles.push(role.to_string());
            added += 1;
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_skips_duplicates() {
        let mut user = UserProfile::new(" Ops@Example.com ");
        assert_eq!(user.email, "ops@example.com");
        assert_eq!(user.grant(&["Deals:read", "deals:READ", "Leads:read", " "]), 2);
        assert_eq!(user.roles, vec!["Deals:read", "Leads:read"]);
    }
}
