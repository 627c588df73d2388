use super::{crud, ledger, ServiceContext};
use crate::db::{Filter, Stored};
use crate::error::ConsoleError;
use crate::finance::{self, ProjectFinancials};
use crate::models::{Earning, Expense, Project};

pub fn by_client(
    ctx: &ServiceContext<'_>,
    client_id: &str,
) -> Result<Vec<Stored<Project>>, ConsoleError> {
    crud::list_where(ctx, vec![Filter::eq("clientId", client_id)])
}

/// Budget, spend and margin for one project.
pub fn financials(
    ctx: &ServiceContext<'_>,
    project_id: &str,
) -> Result<ProjectFinancials, ConsoleError> {
    let project = crud::get::<Project>(ctx, project_id)?.record;
    let expenses: Vec<Expense> = ledger::by_project::<Expense>(ctx, project_id)?
        .into_iter()
        .map(|s| s.record)
        .collect();
    let earnings: Vec<Earning> = ledger::by_project::<Earning>(ctx, project_id)?
        .into_iter()
        .map(|s| s.record)
        .collect();
    Ok(finance::project_financials(&project, &expenses, &earnings))
}
