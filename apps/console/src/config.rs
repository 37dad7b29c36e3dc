//! # Application Configuration
//!
//! Loaded once at startup from environment variables, with defaults.
//!
//! | Variable             | Default                               |
//! |----------------------|---------------------------------------|
//! | `OJRA_DB_PATH`       | `<platform data dir>/ojra.db`         |
//! | `OJRA_PAYMENT_LIMIT` | `10000.00`                            |
//! | `OJRA_MAX_CAPACITY`  | `200`                                 |
//! | `OJRA_STATE_KEY`     | `ojraState`                           |
//!
//! Read-only after startup.

use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

use ojra_core::{EngineConfig, Money, DEFAULT_STATE_KEY, MAX_CAPACITY, PAYMENT_LIMIT};

pub const ENV_DB_PATH: &str = "OJRA_DB_PATH";
pub const ENV_PAYMENT_LIMIT: &str = "OJRA_PAYMENT_LIMIT";
pub const ENV_MAX_CAPACITY: &str = "OJRA_MAX_CAPACITY";
pub const ENV_STATE_KEY: &str = "OJRA_STATE_KEY";

/// Console configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file holding the snapshot and the analytics outbox.
    pub db_path: PathBuf,

    /// Largest fare or single payment accepted.
    pub payment_limit: Money,

    /// Largest seat count the custom vehicle may be given.
    pub max_capacity: u32,

    /// Key the trip snapshot is stored under.
    pub state_key: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        AppConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = match get(ENV_DB_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let payment_limit = match get(ENV_PAYMENT_LIMIT) {
            Some(raw) => parse_limit(&raw)?,
            None => PAYMENT_LIMIT,
        };

        let max_capacity = match get(ENV_MAX_CAPACITY) {
            Some(raw) => parse_max_capacity(&raw)?,
            None => MAX_CAPACITY,
        };

        let state_key = get(ENV_STATE_KEY).unwrap_or_else(|| DEFAULT_STATE_KEY.to_string());

        Ok(AppConfig {
            db_path,
            payment_limit,
            max_capacity,
            state_key,
        })
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new()
            .payment_limit(self.payment_limit)
            .max_capacity(self.max_capacity)
            .state_key(self.state_key.clone())
    }
}

fn parse_limit(raw: &str) -> Result<Money, ConfigError> {
    let limit: Money = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: ENV_PAYMENT_LIMIT.to_string(),
        reason: format!("'{}' is not an amount", raw),
    })?;

    if !limit.is_positive() {
        return Err(ConfigError::InvalidValue {
            key: ENV_PAYMENT_LIMIT.to_string(),
            reason: "must be positive".to_string(),
        });
    }

    Ok(limit)
}

fn parse_max_capacity(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(max) if max > 0 => Ok(max),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_MAX_CAPACITY.to_string(),
            reason: format!("'{}' is not a positive whole number", raw),
        }),
    }
}

/// Platform data directory for the database.
///
/// - **Linux**: `~/.local/share/ojra/ojra.db`
/// - **macOS**: `~/Library/Application Support/com.ojra.ojra/ojra.db`
/// - **Windows**: `%APPDATA%\ojra\ojra\data\ojra.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "ojra", "ojra").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("ojra.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Could not determine the app data directory; set OJRA_DB_PATH")]
    NoDataDir,
}
