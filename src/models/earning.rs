use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityForm;
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation;

/// A document in the `earnings` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Earning {
    pub earning_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub source: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity for Earning {
    const KIND: EntityKind = EntityKind::Earning;

    fn human_id(&self) -> &str {
        &self.earning_id
    }

    fn set_human_id(&mut self, id: String) {
        self.earning_id = id;
    }

    fn display_name(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EarningForm {
    pub account_id: String,
    pub project_id: String,
    pub source: String,
    pub amount: String,
    pub date: String,
    pub description: String,
}

impl EntityForm for EarningForm {
    type Record = Earning;

    fn validate(&self) -> Result<Earning, ConsoleError> {
        Ok(Earning {
            earning_id: String::new(),
            account_id: validation::optional(&self.account_id),
            project_id: validation::optional(&self.project_id),
            source: validation::required("source", &self.source)?,
            amount: validation::required_amount("amount", &self.amount)?,
            date: Some(validation::date("date", &self.date)?),
            description: validation::optional(&self.description),
        })
    }
}
