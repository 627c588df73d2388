use serde::{Deserialize, Serialize};

use super::EntityForm;
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation;

/// A document in the `teams` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Team {
    pub team_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    pub member_ids: Vec<String>,
    pub sales_quota: f64,
}

impl Entity for Team {
    const KIND: EntityKind = EntityKind::Team;

    fn human_id(&self) -> &str {
        &self.team_id
    }

    fn set_human_id(&mut self, id: String) {
        self.team_id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamForm {
    pub name: String,
    pub leader_id: String,
    /// Comma separated employee ids.
    pub member_ids: String,
    pub sales_quota: String,
}

impl EntityForm for TeamForm {
    type Record = Team;

    fn validate(&self) -> Result<Team, ConsoleError> {
        let leader_id = validation::optional(&self.leader_id);
        let mut member_ids = Vec::new();
        for id in validation::list(&self.member_ids) {
            if !member_ids.contains(&id) {
                member_ids.push(id);
            }
        }
        if let Some(leader) = &leader_id {
            if !member_ids.contains(leader) {
                member_ids.insert(0, leader.clone());
            }
        }
        Ok(Team {
            team_id: String::new(),
            name: validation::required("name", &self.name)?,
            leader_id,
            member_ids,
            sales_quota: validation::amount("salesQuota", &self.sales_quota)?,
        })
    }
}
