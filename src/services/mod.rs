//! Screen-level operations: permission check, validation, id generation and
//! the store write, in that order.

pub mod accounts;
pub mod clients;
pub mod crud;
pub mod dashboard;
pub mod deals;
pub mod employees;
pub mod leads;
pub mod ledger;
pub mod projects;
pub mod roles;
pub mod teams;

use crate::auth::Session;
use crate::db::DocumentStore;
use crate::ids::IdGenerator;
use crate::state::AppState;

/// What every service call needs: the store, who is asking, and how to mint
/// human-readable ids.
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub store: &'a DocumentStore,
    pub session: &'a Session,
    pub ids: IdGenerator,
}

impl<'a> ServiceContext<'a> {
    pub fn new(store: &'a DocumentStore, session: &'a Session) -> Self {
        ServiceContext {
            store,
            session,
            ids: IdGenerator::default(),
        }
    }

    pub fn from_state(state: &'a AppState, session: &'a Session) -> Self {
        ServiceContext {
            store: &state.store,
            session,
            ids: state.id_generator(),
        }
    }
}
