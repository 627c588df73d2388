use serde_json::{Map, Value};

use super::{crud, ServiceContext};
use crate::db::Stored;
use crate::error::ConsoleError;
use crate::models::{Employee, Team};

fn write_members(
    ctx: &ServiceContext<'_>,
    team_id: &str,
    members: Vec<String>,
) -> Result<Stored<Team>, ConsoleError> {
    let mut fields = Map::new();
    fields.insert(
        "memberIds".to_string(),
        Value::Array(members.into_iter().map(Value::String).collect()),
    );
    crud::merge_fields(ctx, team_id, fields)
}

/// Add an employee to a team. The employee must exist.
pub fn add_member(
    ctx: &ServiceContext<'_>,
    team_id: &str,
    employee_id: &str,
) -> Result<Stored<Team>, ConsoleError> {
    let team = crud::get::<Team>(ctx, team_id)?;
    crud::get::<Employee>(ctx, employee_id)?;
    if team.record.member_ids.iter().any(|m| m == employee_id) {
        return Ok(team);
    }
    let mut members = team.record.member_ids;
    members.push(employee_id.to_string());
    write_members(ctx, team_id, members)
}

/// Remove an employee from a team. The leader cannot be removed.
pub fn remove_member(
    ctx: &ServiceContext<'_>,
    team_id: &str,
    employee_id: &str,
) -> Result<Stored<Team>, ConsoleError> {
    let team = crud::get::<Team>(ctx, team_id)?;
    if team.record.leader_id.as_deref() == Some(employee_id) {
        return Err(ConsoleError::validation(
            "memberIds",
            format!("{} leads {} and cannot be removed", employee_id, team_id),
        ));
    }
    let before = team.record.member_ids.len();
    let members: Vec<String> = team
        .record
        .member_ids
        .into_iter()
        .filter(|m| m != employee_id)
        .collect();
    if members.len() == before {
        return Err(ConsoleError::not_found("Team member", employee_id));
    }
    write_members(ctx, team_id, members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeForm, TeamForm};
    use crate::services::test_support::{admin, store};

    #[test]
    fn test_add_and_remove_members() {
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        let emp = crud::create(
            &ctx,
            &EmployeeForm {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                ..Default::default()
            },
        )
        .expect("employee");
        let emp_id = emp.record.employee_id.clone();
        let team = crud::create(
            &ctx,
            &TeamForm {
                name: "EMEA".into(),
                leader_id: "EMP-9999".into(),
                ..Default::default()
            },
        )
        .expect("team");
        let team_id = team.record.team_id.clone();

        let added = add_member(&ctx, &team_id, &emp_id).expect("add");
        assert_eq!(added.record.member_ids, vec!["EMP-9999".to_string(), emp_id.clone()]);
        assert!(add_member(&ctx, &team_id, "EMP-0001").is_err());

        let removed = remove_member(&ctx, &team_id, &emp_id).expect("remove");
        assert_eq!(removed.record.member_ids, vec!["EMP-9999"]);
        assert!(remove_member(&ctx, &team_id, "EMP-9999").is_err());
    }
}
