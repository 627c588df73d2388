use serde::{Deserialize, Serialize};

use crate::ids::DEFAULT_ATTEMPTS;

/// Console configuration, stored at `~/.bizops/config.json`.
///
/// Every field has a default so a missing or partial file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Overrides the default `~/.bizops/bizops.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    #[serde(default = "default_id_attempts")]
    pub id_generation_attempts: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Who the CLI signs in as when `--as` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_user_email: Option<String>,
}

fn default_id_attempts() -> usize {
    DEFAULT_ATTEMPTS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: None,
            id_generation_attempts: default_id_attempts(),
            log_level: default_log_level(),
            default_user_email: None,
        }
    }
}
