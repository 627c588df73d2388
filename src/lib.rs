pub mod auth;
pub mod commands;
pub mod db;
pub mod entity;
pub mod error;
pub mod finance;
pub mod ids;
mod migrations;
pub mod models;
pub mod permissions;
pub mod services;
pub mod spreadsheet;
pub mod state;
pub mod types;
pub mod validation;

pub use error::{ConsoleError, ErrorReport};
pub use state::AppState;
