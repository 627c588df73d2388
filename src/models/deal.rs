use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{today, EntityForm};
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation::{self, Labelled};

/// Pipeline stages in the order deals move through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DealStage {
    #[default]
    Prospecting,
    Qualification,
    Proposal,
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl DealStage {
    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

impl Labelled for DealStage {
    const OPTIONS: &'static [Self] = &[
        DealStage::Prospecting,
        DealStage::Qualification,
        DealStage::Proposal,
        DealStage::Negotiation,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ];

    fn label(&self) -> &'static str {
        match self {
            DealStage::Prospecting => "Prospecting",
            DealStage::Qualification => "Qualification",
            DealStage::Proposal => "Proposal",
            DealStage::Negotiation => "Negotiation",
            DealStage::ClosedWon => "Closed Won",
            DealStage::ClosedLost => "Closed Lost",
        }
    }
}

/// A document in the `deals` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deal {
    pub deal_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Employee id of the salesperson.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub value: f64,
    pub stage: DealStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_on: Option<NaiveDate>,
}

impl Entity for Deal {
    const KIND: EntityKind = EntityKind::Deal;

    fn human_id(&self) -> &str {
        &self.deal_id
    }

    fn set_human_id(&mut self, id: String) {
        self.deal_id = id;
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealForm {
    pub title: String,
    pub client_id: String,
    pub owner_id: String,
    pub value: String,
    pub stage: String,
    pub created_on: String,
    pub expected_close: String,
    pub closed_on: String,
}

impl EntityForm for DealForm {
    type Record = Deal;

    fn validate(&self) -> Result<Deal, ConsoleError> {
        let stage = validation::choice("stage", &self.stage, DealStage::Prospecting)?;
        let created_on =
            validation::optional_date("createdOn", &self.created_on)?.unwrap_or_else(today);
        let mut closed_on = validation::optional_date("closedOn", &self.closed_on)?;
        if stage.is_closed() && closed_on.is_none() {
            closed_on = Some(today());
        }
        if !stage.is_closed() {
            closed_on = None;
        }
        validation::date_order("closedOn", Some(created_on), closed_on)?;
        Ok(Deal {
            deal_id: String::new(),
            title: validation::required("title", &self.title)?,
            client_id: validation::optional(&self.client_id),
            owner_id: validation::optional(&self.owner_id),
            value: validation::amount("value", &self.value)?,
            stage,
            created_on: Some(created_on),
            expected_close: validation::optional_date("expectedClose", &self.expected_close)?,
            closed_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_stage_clears_closed_on() {
        let deal = DealForm {
            title: "Renewal".to_string(),
            stage: "Proposal".to_string(),
            created_on: "2026-01-01".to_string(),
            closed_on: "2026-02-01".to_string(),
            ..Default::default()
        }
        .validate()
        .expect("valid");
        assert!(deal.closed_on.is_none());
    }

    #[test]
    fn test_closed_before_created_rejected() {
        let err = DealForm {
            title: "Renewal".to_string(),
            stage: "closed won".to_string(),
            created_on: "2026-03-01".to_string(),
            closed_on: "2026-02-01".to_string(),
            ..Default::default()
        }
        .validate()
        .expect_err("bad order");
        assert!(err.to_string().contains("closedOn"));
    }

    #[test]
    fn test_stage_serializes_with_space() {
        let json = serde_json::to_value(DealStage::ClosedLost).expect("serialize");
        assert_eq!(json, "Closed Lost");
    }
}
