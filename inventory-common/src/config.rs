//! Configuration loading and database path resolution

use crate::api::auth::AdminCredentials;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the database file
pub const DB_FILE_ENV: &str = "DB_FILE";

/// Settings read from the optional TOML config file
///
/// Every key is optional; command-line arguments and environment variables
/// take priority over these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub database_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub cors_origin: Option<String>,
    pub admin_login: Option<String>,
    pub admin_password: Option<String>,
}

impl FileConfig {
    /// Parse TOML config content
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load the config file
    ///
    /// An explicitly requested file must exist. Without one, the platform
    /// default location is tried and a missing file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Admin credentials, when both login and password are configured
    pub fn admin_credentials(&self) -> Option<AdminCredentials> {
        AdminCredentials::from_parts(self.admin_login.as_deref(), self.admin_password.as_deref())
    }
}

/// Database path resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent default data directory
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &FileConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database_file {
        return path.clone();
    }

    default_database_path()
}

/// Platform config file location (`<config dir>/inventory/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("inventory").join("config.toml"))
}

/// OS-dependent default database file
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("inventory"))
        .unwrap_or_else(|| PathBuf::from("./inventory_data"))
        .join("inventory.sqlite")
}
