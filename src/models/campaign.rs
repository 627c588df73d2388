use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityForm;
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation::{self, Labelled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CampaignStatus {
    #[default]
    Planned,
    Active,
    Paused,
    Completed,
}

impl Labelled for CampaignStatus {
    const OPTIONS: &'static [Self] = &[
        CampaignStatus::Planned,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Completed,
    ];

    fn label(&self) -> &'static str {
        match self {
            CampaignStatus::Planned => "Planned",
            CampaignStatus::Active => "Active",
            CampaignStatus::Paused => "Paused",
            CampaignStatus::Completed => "Completed",
        }
    }
}

/// A document in the `campaigns` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Campaign {
    pub campaign_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub budget: f64,
    pub spent: f64,
    pub revenue: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub status: CampaignStatus,
}

impl Entity for Campaign {
    const KIND: EntityKind = EntityKind::Campaign;

    fn human_id(&self) -> &str {
        &self.campaign_id
    }

    fn set_human_id(&mut self, id: String) {
        self.campaign_id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignForm {
    pub name: String,
    pub channel: String,
    pub budget: String,
    pub spent: String,
    pub revenue: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
}

impl EntityForm for CampaignForm {
    type Record = Campaign;

    fn validate(&self) -> Result<Campaign, ConsoleError> {
        let start_date = validation::optional_date("startDate", &self.start_date)?;
        let end_date = validation::optional_date("endDate", &self.end_date)?;
        validation::date_order("endDate", start_date, end_date)?;
        Ok(Campaign {
            campaign_id: String::new(),
            name: validation::required("name", &self.name)?,
            channel: validation::optional(&self.channel),
            budget: validation::amount("budget", &self.budget)?,
            spent: validation::amount("spent", &self.spent)?,
            revenue: validation::amount("revenue", &self.revenue)?,
            start_date,
            end_date,
            status: validation::choice("status", &self.status, CampaignStatus::Planned)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_numbers_default_to_zero() {
        let campaign = CampaignForm {
            name: "Spring promo".to_string(),
            ..Default::default()
        }
        .validate()
        .expect("valid");
        assert_eq!((campaign.budget, campaign.spent, campaign.revenue), (0.0, 0.0, 0.0));
        assert_eq!(campaign.status, CampaignStatus::Planned);
    }
}
