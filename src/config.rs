//! Application-level configuration loading for the rating engine.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCHDAY_BACK_CONFIG_PATH";

const DEFAULT_MAX_UPDATE_ATTEMPTS: u32 = 8;
const DEFAULT_LEDGER_CAPACITY: usize = 256;
const DEFAULT_SEASON_DECAY_PERCENT: u8 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Upper bound on read-modify-write attempts for a single record.
    pub max_update_attempts: u32,
    /// Number of applied outcome keys remembered per credited record.
    pub ledger_capacity: usize,
    /// Share of points kept by a season reset, in percent.
    pub season_decay_percent: u8,
    /// Token expected in `X-Admin-Token`; admin routes are refused when unset.
    pub admin_token: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        max_update_attempts = config.max_update_attempts,
                        ledger_capacity = config.ledger_capacity,
                        admin = config.admin_token.is_some(),
                        "loaded engine configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document, filling absent keys with defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_update_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            season_decay_percent: DEFAULT_SEASON_DECAY_PERCENT,
            admin_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    max_update_attempts: Option<u32>,
    ledger_capacity: Option<usize>,
    season_decay_percent: Option<u8>,
    admin_token: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            max_update_attempts: value
                .max_update_attempts
                .filter(|attempts| *attempts > 0)
                .unwrap_or(defaults.max_update_attempts),
            ledger_capacity: value
                .ledger_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.ledger_capacity),
            season_decay_percent: value
                .season_decay_percent
                .map(|percent| percent.min(100))
                .unwrap_or(defaults.season_decay_percent),
            admin_token: value.admin_token.filter(|token| !token.trim().is_empty()),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
