use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EntityForm, RecordStatus};
use crate::entity::{Entity, EntityKind};
use crate::error::ConsoleError;
use crate::validation;

/// A document in the `employees` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub salary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    /// Closed-won deal value expected per period. Zero means no quota.
    pub sales_quota: f64,
    pub status: RecordStatus,
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn human_id(&self) -> &str {
        &self.employee_id
    }

    fn set_human_id(&mut self, id: String) {
        self.employee_id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub department: String,
    pub salary: String,
    pub team_id: String,
    pub hire_date: String,
    pub sales_quota: String,
    pub status: String,
}

impl EntityForm for EmployeeForm {
    type Record = Employee;

    fn validate(&self) -> Result<Employee, ConsoleError> {
        Ok(Employee {
            employee_id: String::new(),
            name: validation::required("name", &self.name)?,
            email: validation::email("email", &self.email)?,
            phone: validation::optional(&self.phone),
            position: validation::optional(&self.position),
            department: validation::optional(&self.department),
            salary: validation::amount("salary", &self.salary)?,
            team_id: validation::optional(&self.team_id),
            hire_date: validation::optional_date("hireDate", &self.hire_date)?,
            sales_quota: validation::amount("salesQuota", &self.sales_quota)?,
            status: validation::choice("status", &self.status, RecordStatus::Active)?,
        })
    }
}
