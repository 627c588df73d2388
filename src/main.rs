mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use bizops_lib::auth::StaticIdentity;
use bizops_lib::commands::{self, DashboardKind};
use bizops_lib::entity::EntityKind;
use bizops_lib::state::{config_path, load_config_from};
use bizops_lib::types::Config;
use bizops_lib::{AppState, ConsoleError, ErrorReport};

use cli::{Cli, Commands, DashboardArg};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_path().and_then(|p| load_config_from(&p).map(|c| (p, c))) {
        Ok(pair) => pair,
        Err(e) => return report(&e),
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.1.log_level),
    )
    .init();

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(err: &ConsoleError) -> ExitCode {
    log::error!("{:?}", err);
    let report = ErrorReport::from(err);
    eprintln!("error: {}", report.message);
    eprintln!("  {}", report.recovery_suggestion);
    ExitCode::FAILURE
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ConsoleError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| ConsoleError::Store(e.into()))?;
    println!("{}", text);
    Ok(())
}

fn parse_kind(name: &str) -> Result<EntityKind, ConsoleError> {
    EntityKind::parse(name)
        .ok_or_else(|| ConsoleError::validation("entity", format!("unknown collection '{}'", name)))
}

fn run(cli: Cli, (config_file, config): (PathBuf, Config)) -> Result<(), ConsoleError> {
    let default_user = config.default_user_email.clone();
    let state = AppState::open(config_file, config, cli.db.clone())?;

    // Commands that need no session.
    match &cli.command {
        Commands::Grant { email, permission } => {
            return print_json(&commands::grant_permission(&state, email, permission)?);
        }
        Commands::Status => return print_json(&commands::store_status(&state)?),
        _ => {}
    }

    let identity = match cli.user.or(default_user) {
        Some(email) => StaticIdentity::signed_in(&email),
        None => StaticIdentity::signed_out(),
    };
    let session = commands::sign_in(&state, &identity)?;

    match cli.command {
        Commands::List { collection } => {
            print_json(&commands::list_collection(&state, &session, parse_kind(&collection)?)?)
        }
        Commands::Dashboard { which } => {
            let which = match which {
                DashboardArg::Finance => DashboardKind::Finance,
                DashboardArg::Marketing => DashboardKind::Marketing,
                DashboardArg::Sales => DashboardKind::Sales,
            };
            print_json(&commands::get_dashboard(&state, &session, which)?)
        }
        Commands::Import { entity, file } => {
            let kind = parse_kind(&entity)?;
            let summary = commands::import_spreadsheet(&state, &session, kind, &file)?;
            print_json(&summary)
        }
        Commands::Export { entity, file } => {
            let rows = commands::export_spreadsheet(&state, &session, parse_kind(&entity)?, &file)?;
            println!("Exported {} row(s) to {}", rows, file.display());
            Ok(())
        }
        Commands::AssignRole { email, role_id } => {
            print_json(&commands::assign_role(&state, &session, &email, &role_id)?)
        }
        Commands::Whoami => print_json(&commands::whoami(&session)),
        Commands::Grant { .. } | Commands::Status => Ok(()),
    }
}
