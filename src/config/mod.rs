//! Runtime configuration, read from a `config.toml` file.
//!
//! Every key is optional; a missing file yields [`AppConfig::default`].
//!
//! ```toml
//! database_path = "/var/lib/galleryhub/galleryhub.db"
//! pool_max_size = 8
//! default_page_size = 20
//! max_page_size = 100
//! log_level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

const CONFIG_FILE: &str = "config.toml";
pub const APP_NAME: &str = "galleryhub";

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "GALLERYHUB_CONFIG";

/// Environment variable overriding `database_path`
pub const DB_PATH_ENV: &str = "GALLERYHUB_DB_PATH";

pub const DEFAULT_POOL_MAX_SIZE: u32 = 15;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file; defaults to `{DATA_DIR}/galleryhub/galleryhub.db`
    pub database_path: Option<PathBuf>,
    pub pool_max_size: u32,
    pub busy_timeout_ms: u32,
    /// Page size used when a listing does not pass `count`
    pub default_page_size: u32,
    /// Upper bound applied to `count`; `None` leaves it to the caller
    pub max_page_size: Option<u32>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Load from `$GALLERYHUB_CONFIG`, else the per-user config dir, else defaults.
/// `$GALLERYHUB_DB_PATH` wins over whatever the file says.
pub fn load() -> AppResult<AppConfig> {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let mut config = match explicit {
        Some(path) => load_from_path(&path)?,
        None => match get_default_config_path() {
            Some(path) if path.exists() => load_from_path(&path)?,
            _ => AppConfig::default(),
        },
    };

    if let Some(db_path) = std::env::var_os(DB_PATH_ENV) {
        config.database_path = Some(PathBuf::from(db_path));
    }

    Ok(config)
}

pub fn load_from_path(path: &Path) -> AppResult<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    let config: AppConfig = toml::from_str(&content)?;
    config.check()?;
    Ok(config)
}

pub fn save_to_path(config: &AppConfig, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(|e| AppError::Config(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}

impl AppConfig {
    fn check(&self) -> AppResult<()> {
        if self.pool_max_size == 0 {
            return Err(AppError::Config("pool_max_size must be at least 1".to_string()));
        }
        if self.default_page_size == 0 {
            return Err(AppError::Config(
                "default_page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
