use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EntityForm, RecordStatus};
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation::{self, Labelled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccountType {
    #[default]
    Operating,
    Checking,
    Savings,
    Credit,
    Investment,
}

impl Labelled for AccountType {
    const OPTIONS: &'static [Self] = &[
        AccountType::Operating,
        AccountType::Checking,
        AccountType::Savings,
        AccountType::Credit,
        AccountType::Investment,
    ];

    fn label(&self) -> &'static str {
        match self {
            AccountType::Operating => "Operating",
            AccountType::Checking => "Checking",
            AccountType::Savings => "Savings",
            AccountType::Credit => "Credit",
            AccountType::Investment => "Investment",
        }
    }
}

/// A document in the `accounts` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub account_id: String,
    pub name: String,
    pub account_type: AccountType,
    pub balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Account {
    const KIND: EntityKind = EntityKind::Account;

    fn human_id(&self) -> &str {
        &self.account_id
    }

    fn set_human_id(&mut self, id: String) {
        self.account_id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountForm {
    pub name: String,
    pub account_type: String,
    pub balance: String,
    pub client_id: String,
    pub status: String,
    pub opened_on: String,
    pub notes: String,
}

impl EntityForm for AccountForm {
    type Record = Account;

    fn validate(&self) -> Result<Account, ConsoleError> {
        Ok(Account {
            account_id: String::new(),
            name: validation::required("name", &self.name)?,
            account_type: validation::choice(
                "accountType",
                &self.account_type,
                AccountType::Operating,
            )?,
            balance: validation::amount("balance", &self.balance)?,
            client_id: validation::optional(&self.client_id),
            status: validation::choice("status", &self.status, RecordStatus::Active)?,
            opened_on: validation::optional_date("openedOn", &self.opened_on)?,
            notes: validation::optional(&self.notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults() {
        let form = AccountForm {
            name: "Main operating".to_string(),
            ..Default::default()
        };
        let account = form.validate().expect("valid");
        assert_eq!(account.account_type, AccountType::Operating);
        assert_eq!(account.balance, 0.0);
        assert_eq!(account.status, RecordStatus::Active);
        assert!(account.client_id.is_none());
    }

    #[test]
    fn test_form_requires_name() {
        let err = AccountForm::default().validate().expect_err("missing name");
        assert!(matches!(err, ConsoleError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_decode_tolerates_missing_fields() {
        let account: Account =
            serde_json::from_value(serde_json::json!({"accountId": "ACC-1234", "name": "Ops"}))
                .expect("decode");
        assert_eq!(account.account_id, "ACC-1234");
        assert_eq!(account.balance, 0.0);
    }
}
