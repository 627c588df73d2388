use super::{crud, ServiceContext};
use crate::db::{Filter, Stored};
use crate::error::ConsoleError;
use crate::models::Employee;

pub fn by_email(
    ctx: &ServiceContext<'_>,
    email: &str,
) -> Result<Option<Stored<Employee>>, ConsoleError> {
    let email = email.trim().to_lowercase();
    Ok(crud::list_where(ctx, vec![Filter::eq("email", email)])?
        .into_iter()
        .next())
}

pub fn by_team(
    ctx: &ServiceContext<'_>,
    team_id: &str,
) -> Result<Vec<Stored<Employee>>, ConsoleError> {
    crud::list_where(ctx, vec![Filter::eq("teamId", team_id)])
}
