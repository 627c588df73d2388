use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::db::{DocumentDb, DocumentStore};
use crate::error::ConsoleError;
use crate::ids::IdGenerator;
use crate::types::Config;

/// Shared state for one console process.
pub struct AppState {
    pub config: Mutex<Config>,
    config_file: PathBuf,
    pub store: DocumentStore,
}

impl AppState {
    /// Open the database named by `db_override`, else by the config, else
    /// the default `~/.bizops/bizops.db`.
    pub fn open(
        config_file: PathBuf,
        config: Config,
        db_override: Option<PathBuf>,
    ) -> Result<Self, ConsoleError> {
        let db_path = match (db_override, &config.database_path) {
            (Some(p), _) => p,
            (None, Some(p)) => PathBuf::from(p),
            (None, None) => DocumentDb::default_path()?,
        };
        log::debug!("Opening database at {}", db_path.display());
        let store = DocumentStore::open_at(db_path)?;
        Ok(AppState::with_parts(config, config_file, store))
    }

    pub fn with_parts(config: Config, config_file: PathBuf, store: DocumentStore) -> Self {
        AppState {
            config: Mutex::new(config),
            config_file,
            store,
        }
    }

    /// In-memory store with the given config; used by tests and dry runs.
    pub fn in_memory(config: Config, config_file: PathBuf) -> Result<Self, ConsoleError> {
        Ok(AppState::with_parts(config, config_file, DocumentStore::in_memory()?))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn id_generator(&self) -> IdGenerator {
        IdGenerator::with_attempts(self.config.lock().id_generation_attempts)
    }
}

/// Path of `~/.bizops/config.json`.
pub fn config_path() -> Result<PathBuf, ConsoleError> {
    let home = dirs::home_dir()
        .ok_or_else(|| ConsoleError::Config("Could not find home directory".to_string()))?;
    Ok(home.join(".bizops").join("config.json"))
}

/// Load config from `path`. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConsoleError> {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConsoleError::Config(format!("Failed to read config: {}", e)))?;
    let config: Config = serde_json::from_str(&content)
        .map_err(|e| ConsoleError::Config(format!("Failed to parse config: {}", e)))?;

    if config.id_generation_attempts == 0 {
        return Err(ConsoleError::Config(
            "idGenerationAttempts must be at least 1".to_string(),
        ));
    }
    Ok(config)
}

/// Apply `mutator` to the current config, write it to disk and update the
/// in-memory copy.
pub fn create_or_update_config(
    state: &AppState,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, ConsoleError> {
    let mut guard = state.config.lock();
    let mut config = guard.clone();
    mutator(&mut config);

    let path = state.config_file();
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| ConsoleError::Config(format!("Failed to create config dir: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(&config)
        .map_err(|e| ConsoleError::Config(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, content)
        .map_err(|e| ConsoleError::Config(format!("Failed to write config: {}", e)))?;

    *guard = config.clone();
    log::info!("Saved config to {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("config.json")).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"idGenerationAttempts":0}"#).expect("write");
        assert!(matches!(load_config_from(&path), Err(ConsoleError::Config(_))));
    }

    #[test]
    fn test_create_or_update_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let state = AppState::in_memory(Config::default(), path.clone()).expect("state");

        let saved = create_or_update_config(&state, |c| {
            c.default_user_email = Some("ops@example.com".to_string());
            c.id_generation_attempts = 3;
        })
        .expect("save");

        assert_eq!(state.id_generator().attempts(), 3);
        assert_eq!(load_config_from(&path).expect("reload"), saved);
    }
}
