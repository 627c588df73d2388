use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityForm;
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation::{self, Labelled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
    Cancelled,
}

impl Labelled for ProjectStatus {
    const OPTIONS: &'static [Self] = &[
        ProjectStatus::Planned,
        ProjectStatus::Active,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "Planned",
            ProjectStatus::Active => "Active",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }
}

/// A document in the `projects` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub budget: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn human_id(&self) -> &str {
        &self.project_id
    }

    fn set_human_id(&mut self, id: String) {
        self.project_id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectForm {
    pub name: String,
    pub client_id: String,
    pub account_id: String,
    pub team_id: String,
    pub budget: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub description: String,
}

impl EntityForm for ProjectForm {
    type Record = Project;

    fn validate(&self) -> Result<Project, ConsoleError> {
        let start_date = validation::optional_date("startDate", &self.start_date)?;
        let end_date = validation::optional_date("endDate", &self.end_date)?;
        validation::date_order("endDate", start_date, end_date)?;
        Ok(Project {
            project_id: String::new(),
            name: validation::required("name", &self.name)?,
            client_id: validation::optional(&self.client_id),
            account_id: validation::optional(&self.account_id),
            team_id: validation::optional(&self.team_id),
            budget: validation::amount("budget", &self.budget)?,
            start_date,
            end_date,
            status: validation::choice("status", &self.status, ProjectStatus::Planned)?,
            description: validation::optional(&self.description),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_before_start_rejected() {
        let form = ProjectForm {
            name: "Website".to_string(),
            start_date: "2026-05-01".to_string(),
            end_date: "2026-04-01".to_string(),
            ..Default::default()
        };
        let err = form.validate().expect_err("bad dates");
        assert!(err.to_string().contains("endDate"));
    }

    #[test]
    fn test_on_hold_serializes_with_space() {
        let form = ProjectForm {
            name: "Website".to_string(),
            status: "on hold".to_string(),
            budget: "1000".to_string(),
            ..Default::default()
        };
        let project = form.validate().expect("valid");
        let json = serde_json::to_value(&project).expect("serialize");
        assert_eq!(json["status"], "On Hold");
        assert_eq!(json["budget"], 1000.0);
    }
}
