//! Configuration for clients and modules
//!
//! Defaults mirror the canonical OpenPanel installation layout; a TOML file
//! can override any of them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Default Unix domain socket the daemon listens on
pub const DEFAULT_SOCKET_PATH: &str = "/var/openpanel/sockets/openpanel-core.sock";

/// TCP port for remote (TLS) endpoints
pub const DEFAULT_RPC_PORT: u16 = 4089;

/// Staging directory modules run in, one subdirectory per module
pub const DEFAULT_STAGING_DIR: &str = "/var/openpanel/conf/staging";

/// Interval between keep-alive pings while a session is established
pub const DEFAULT_KEEPALIVE_SECS: u64 = 60;

/// Client/module configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Path to the daemon's Unix domain socket
    pub socket_path: PathBuf,

    /// Remote host; when set, the client connects over TCP instead of the
    /// local socket
    pub host: Option<String>,

    /// TCP port for remote endpoints
    pub port: u16,

    /// Use TLS for remote endpoints
    pub ssl: bool,

    /// Seconds between keep-alive pings
    pub keepalive_secs: u64,

    /// Module staging directory
    pub staging_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            host: None,
            port: DEFAULT_RPC_PORT,
            ssl: true,
            keepalive_secs: DEFAULT_KEEPALIVE_SECS,
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
        }
    }
}

impl CoreConfig {
    /// Keep-alive interval as a duration
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }

    /// Staging working directory for the named module
    pub fn module_staging_dir(&self, module_name: &str) -> PathBuf {
        self.staging_dir.join(module_name)
    }
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_installation_layout() {
        let config = CoreConfig::default();
        assert_eq!(config.socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
        assert_eq!(config.port, 4089);
        assert!(config.ssl);
        assert_eq!(config.keepalive_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_module_staging_dir() {
        let config = CoreConfig::default();
        assert_eq!(
            config.module_staging_dir("Domain"),
            PathBuf::from("/var/openpanel/conf/staging/Domain")
        );
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = CoreConfig::default();
        config.host = Some("panel.example.net".to_string());
        config.ssl = false;

        save_config(&path, &config).unwrap();
        let loaded: CoreConfig = load_config(&path).unwrap();

        assert_eq!(loaded.host.as_deref(), Some("panel.example.net"));
        assert!(!loaded.ssl);
        assert_eq!(loaded.port, 4089);
    }

    #[test]
    fn test_missing_config_file() {
        let result: Result<CoreConfig, _> = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CoreConfig = toml::from_str("host = \"panel.example.net\"").unwrap();
        assert_eq!(config.host.as_deref(), Some("panel.example.net"));
        assert_eq!(config.port, DEFAULT_RPC_PORT);
        assert_eq!(config.keepalive_secs, DEFAULT_KEEPALIVE_SECS);
    }
}
