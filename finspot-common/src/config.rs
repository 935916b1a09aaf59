//! Configuration loading and root folder resolution
//!
//! Values are resolved in priority order:
//! 1. Command-line argument / environment variable
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing or malformed config file is never fatal: the caller logs it and
//! the remaining tiers apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "FINSPOT_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "finspot.db";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5730;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Standard config file locations, most specific first
fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("finspot").join("config.toml"));
    }
    if cfg!(unix) {
        candidates.push(PathBuf::from("/etc/finspot/config.toml"));
    }
    candidates
}

/// First existing config file, if any
pub fn find_config_file() -> Option<PathBuf> {
    config_file_candidates().into_iter().find(|p| p.exists())
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("finspot"))
        .unwrap_or_else(|| PathBuf::from("./finspot_data"))
}

/// Resolve the root folder
///
/// Priority: CLI argument → `env_var_name` → TOML `root_folder` → OS default.
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Values supplied on the command line (or their environment equivalents)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
}

impl ServerConfig {
    pub fn resolve(overrides: ConfigOverrides, toml_config: &TomlConfig) -> Self {
        let root_folder = resolve_root_folder(
            overrides.root_folder.as_deref(),
            ROOT_FOLDER_ENV,
            toml_config,
        );

        Self {
            root_folder,
            bind_address: overrides
                .bind_address
                .or_else(|| toml_config.bind_address.clone())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: overrides
                .port
                .or(toml_config.port)
                .unwrap_or(DEFAULT_PORT),
            log_level: overrides
                .log_level
                .or_else(|| toml_config.log_level.clone())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// `host:port` for the listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// Create the root folder if missing
    pub fn ensure_root_folder(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_parses_partial_config() {
        let config: TomlConfig = toml::from_str("port = 8080\nlog_level = \"debug\"").unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.root_folder.is_none());
        assert!(config.bind_address.is_none());
    }

    #[test]
    fn test_cli_arg_wins() {
        let toml_config = TomlConfig {
            root_folder: Some(PathBuf::from("/from/toml")),
            ..Default::default()
        };
        let resolved = resolve_root_folder(
            Some(Path::new("/from/cli")),
            "FINSPOT_TEST_UNSET_VARIABLE",
            &toml_config,
        );
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_server_config_overrides_over_toml_over_defaults() {
        let toml_config = TomlConfig {
            root_folder: Some(PathBuf::from("/data/finspot")),
            bind_address: Some("0.0.0.0".to_string()),
            port: Some(9000),
            log_level: None,
        };
        let overrides = ConfigOverrides {
            root_folder: Some(PathBuf::from("/cli/root")),
            port: Some(7000),
            ..Default::default()
        };

        let config = ServerConfig::resolve(overrides, &toml_config);
        assert_eq!(config.root_folder, PathBuf::from("/cli/root"));
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 7000);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.listen_address(), "0.0.0.0:7000");
        assert_eq!(config.database_path(), PathBuf::from("/cli/root/finspot.db"));
    }

    #[test]
    fn test_default_root_folder_not_empty() {
        assert!(!default_root_folder().as_os_str().is_empty());
    }
}
