use serde::{Deserialize, Serialize};

use super::{EntityForm, RecordStatus};
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation;

/// A document in the `clients` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    pub client_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub status: RecordStatus,
}

impl Entity for Client {
    const KIND: EntityKind = EntityKind::Client;

    fn human_id(&self) -> &str {
        &self.client_id
    }

    fn set_human_id(&mut self, id: String) {
        self.client_id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    pub account_id: String,
    pub status: String,
}

impl EntityForm for ClientForm {
    type Record = Client;

    fn validate(&self) -> Result<Client, ConsoleError> {
        Ok(Client {
            client_id: String::new(),
            name: validation::required("name", &self.name)?,
            email: validation::optional_email("email", &self.email)?,
            phone: validation::optional(&self.phone),
            company: validation::optional(&self.company),
            address: validation::optional(&self.address),
            account_id: validation::optional(&self.account_id),
            status: validation::choice("status", &self.status, RecordStatus::Active)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_email() {
        let form = ClientForm {
            name: "Northwind".to_string(),
            email: "sales at northwind".to_string(),
            ..Default::default()
        };
        let err = form.validate().expect_err("bad email");
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_status_parsing() {
        let form = ClientForm {
            name: "Northwind".to_string(),
            status: "inactive".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate().expect("valid").status, RecordStatus::Inactive);
    }
}
