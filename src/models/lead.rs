use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{today, EntityForm};
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation::{self, Labelled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl Labelled for LeadStatus {
    const OPTIONS: &'static [Self] = &[
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    fn label(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Converted => "Converted",
            LeadStatus::Lost => "Lost",
        }
    }
}

/// A document in the `leads` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lead {
    pub lead_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Where the lead came from ("Website", "Referral", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    pub status: LeadStatus,
    pub estimated_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_on: Option<NaiveDate>,
}

impl Lead {
    pub fn is_converted(&self) -> bool {
        self.status == LeadStatus::Converted
    }
}

impl Entity for Lead {
    const KIND: EntityKind = EntityKind::Lead;

    fn human_id(&self) -> &str {
        &self.lead_id
    }

    fn set_human_id(&mut self, id: String) {
        self.lead_id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub source: String,
    pub campaign_id: String,
    pub status: String,
    pub estimated_value: String,
    pub created_on: String,
    /// Only kept for converted leads; blank means today.
    pub converted_on: String,
}

impl EntityForm for LeadForm {
    type Record = Lead;

    fn validate(&self) -> Result<Lead, ConsoleError> {
        let status = validation::choice("status", &self.status, LeadStatus::New)?;
        let created_on =
            validation::optional_date("createdOn", &self.created_on)?.unwrap_or_else(today);
        let converted_on = if status == LeadStatus::Converted {
            let on = validation::optional_date("convertedOn", &self.converted_on)?;
            Some(on.unwrap_or_else(today))
        } else {
            None
        };
        Ok(Lead {
            lead_id: String::new(),
            name: validation::required("name", &self.name)?,
            email: validation::optional_email("email", &self.email)?,
            company: validation::optional(&self.company),
            source: validation::optional(&self.source),
            campaign_id: validation::optional(&self.campaign_id),
            status,
            estimated_value: validation::amount("estimatedValue", &self.estimated_value)?,
            created_on: Some(created_on),
            converted_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_new_and_today() {
        let lead = LeadForm {
            name: "Jo".to_string(),
            ..Default::default()
        }
        .validate()
        .expect("valid");
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.created_on, Some(today()));
        assert!(lead.converted_on.is_none());
    }

    #[test]
    fn test_converted_on_stamped() {
        let lead = LeadForm {
            name: "Jo".to_string(),
            status: "Converted".to_string(),
            ..Default::default()
        }
        .validate()
        .expect("valid");
        assert!(lead.is_converted());
        assert_eq!(lead.converted_on, Some(today()));
    }

    #[test]
    fn test_converted_on_kept_when_given() {
        let lead = LeadForm {
            name: "Jo".to_string(),
            status: "Converted".to_string(),
            converted_on: "2026-03-01".to_string(),
            ..Default::default()
        }
        .validate()
        .expect("valid");
        assert_eq!(lead.converted_on, NaiveDate::from_ymd_opt(2026, 3, 1));
    }
}
