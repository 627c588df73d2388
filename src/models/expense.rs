use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityForm;
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation;

/// A document in the `expenses` collection. `accountId` and `projectId` are
/// plain references; nothing guarantees they resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Expense {
    pub expense_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub category: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity for Expense {
    const KIND: EntityKind = EntityKind::Expense;

    fn human_id(&self) -> &str {
        &self.expense_id
    }

    fn set_human_id(&mut self, id: String) {
        self.expense_id = id;
    }

    fn display_name(&self) -> &str {
        &self.category
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseForm {
    pub account_id: String,
    pub project_id: String,
    pub category: String,
    pub amount: String,
    pub date: String,
    pub vendor: String,
    pub description: String,
}

impl EntityForm for ExpenseForm {
    type Record = Expense;

    fn validate(&self) -> Result<Expense, ConsoleError> {
        Ok(Expense {
            expense_id: String::new(),
            account_id: validation::optional(&self.account_id),
            project_id: validation::optional(&self.project_id),
            category: validation::required("category", &self.category)?,
            amount: validation::required_amount("amount", &self.amount)?,
            date: Some(validation::date("date", &self.date)?),
            vendor: validation::optional(&self.vendor),
            description: validation::optional(&self.description),
        })
    }
}
