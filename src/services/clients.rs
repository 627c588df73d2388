use super::{crud, ServiceContext};
use crate::db::{Filter, Stored};
use crate::error::ConsoleError;
use crate::models::Client;

/// Clients whose status is `Active`.
pub fn list_active(ctx: &ServiceContext<'_>) -> Result<Vec<Stored<Client>>, ConsoleError> {
    crud::list_where(ctx, vec![Filter::eq("status", "Active")])
}
