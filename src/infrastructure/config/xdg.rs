//! XDG config store adapter

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const APP_DIR: &str = "ghost-rec";

/// Default export destination when none is configured
pub fn default_output_path() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("blackbox.wav")
}

/// XDG-compliant config store
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// Create a new XDG config store with default path
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR);

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn to_toml(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.exists() {
            return Ok(AppConfig::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::parse_toml(&content)
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = Self::to_toml(config)?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }

        self.save(&AppConfig::defaults()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::OscConfig;

    #[test]
    fn default_path_is_xdg() {
        let store = XdgConfigStore::new();
        let path = store.path();
        assert!(path.to_string_lossy().contains("ghost-rec"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn default_output_is_wav() {
        let path = default_output_path();
        assert!(path.to_string_lossy().contains("ghost-rec"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wav"));
    }

    #[test]
    fn parse_toml_with_osc_table() {
        let content = r#"
retention = "2m"
pre_roll = "50ms"
output_path = "/srv/takes/last.wav"

[osc]
port = 9100
address = "/rig/marker"
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.retention, Some("2m".to_string()));
        assert_eq!(config.pre_roll, Some("50ms".to_string()));
        assert_eq!(config.output_path, Some("/srv/takes/last.wav".to_string()));
        assert_eq!(config.osc_port_or_default(), 9100);
        assert_eq!(config.osc_address_or_default(), "/rig/marker");
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = XdgConfigStore::parse_toml("retention = [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn to_toml_round_trip() {
        let config = AppConfig {
            retention: Some("30s".to_string()),
            pre_time: Some("200ms".to_string()),
            osc: Some(OscConfig {
                port: Some(9001),
                address: None,
            }),
            ..Default::default()
        };

        let toml = XdgConfigStore::to_toml(&config).unwrap();
        let parsed = XdgConfigStore::parse_toml(&toml).unwrap();

        assert_eq!(parsed.retention, config.retention);
        assert_eq!(parsed.pre_time, config.pre_time);
        assert_eq!(parsed.osc_port_or_default(), 9001);
    }

    #[tokio::test]
    async fn init_then_load_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("nested/config.toml"));

        store.init().await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.retention, Some("1m".to_string()));
        assert!(matches!(store.init().await, Err(ConfigError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("absent.toml"));
        let loaded = store.load().await.unwrap();
        assert!(loaded.retention.is_none());
    }
}
