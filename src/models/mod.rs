//! Typed records for every console collection, plus the raw-string forms
//! they are submitted through.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::ConsoleError;
use crate::validation::Labelled;

pub mod account;
pub mod campaign;
pub mod client;
pub mod deal;
pub mod earning;
pub mod employee;
pub mod expense;
pub mod lead;
pub mod project;
pub mod role;
pub mod team;
pub mod user;

pub use account::{Account, AccountForm, AccountType};
pub use campaign::{Campaign, CampaignForm, CampaignStatus};
pub use client::{Client, ClientForm};
pub use deal::{Deal, DealForm, DealStage};
pub use earning::{Earning, EarningForm};
pub use employee::{Employee, EmployeeForm};
pub use expense::{Expense, ExpenseForm};
pub use lead::{Lead, LeadForm, LeadStatus};
pub use project::{Project, ProjectForm, ProjectStatus};
pub use role::{Role, RoleForm};
pub use team::{Team, TeamForm};
pub use user::UserProfile;

/// A submitted form that validates into a record (without its human id).
///
/// Form fields share the record's camelCase keys, so a stored document can
/// pre-fill a form for editing.
pub trait EntityForm: Serialize + DeserializeOwned {
    type Record: Entity;

    fn validate(&self) -> Result<Self::Record, ConsoleError>;
}

/// Active/inactive flag shared by accounts, clients and employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl Labelled for RecordStatus {
    const OPTIONS: &'static [Self] = &[RecordStatus::Active, RecordStatus::Inactive];

    fn label(&self) -> &'static str {
        match self {
            RecordStatus::Active => "Active",
            RecordStatus::Inactive => "Inactive",
        }
    }
}

/// Today's date in local time, used for default form dates.
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
