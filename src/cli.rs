//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Business operations console
#[derive(Parser, Debug)]
#[command(name = "bizops")]
#[command(
    about = "Business operations console: accounts, people, finance, marketing and sales",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Sign in as this email (defaults to `defaultUserEmail` in config)
    #[arg(long = "as", global = true, env = "BIZOPS_USER")]
    pub user: Option<String>,

    /// Database file (overrides `databasePath` in config)
    #[arg(long, global = true, env = "BIZOPS_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every record in a collection as JSON
    List {
        /// Collection or entity name, e.g. `accounts` or `deal`
        collection: String,
    },

    /// Show a dashboard
    Dashboard {
        #[arg(value_enum)]
        which: DashboardArg,
    },

    /// Import a CSV or Excel sheet (accounts, clients, employees)
    Import { entity: String, file: PathBuf },

    /// Export a collection to CSV
    Export { entity: String, file: PathBuf },

    /// Copy a role's permissions onto a user
    AssignRole { email: String, role_id: String },

    /// Grant one permission string without a session (first-run bootstrap)
    Grant { email: String, permission: String },

    /// Show the signed-in user's screens and actions
    Whoami,

    /// Collection counts and recent imports
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DashboardArg {
    Finance,
    Marketing,
    Sales,
}
