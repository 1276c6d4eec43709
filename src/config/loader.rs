use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::DeviceError;

use super::{paths, Config};

pub(super) const DEVICE_URL_ENV: &str = "RELAY_DEVICE_URL";

impl Config {
    /// Load configuration from config.json
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let config_path = paths::get_config_path();
        let mut config = match Self::load_from(&config_path).await {
            Ok(config) => config,
            Err(err) => {
                warn!(kind = ?err.kind(), error = %err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };

        if let Ok(custom) = env::var(DEVICE_URL_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                config.device_url = trimmed.to_string();
            }
        }

        info!(
            device = %config.device_url,
            poll_interval_ms = config.poll_interval_ms,
            "Loaded configuration"
        );
        config
    }

    /// Read a config file, treating a missing file as "all defaults".
    pub async fn load_from(config_path: &Path) -> Result<Self, DeviceError> {
        if !config_path.exists() {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path).await?;

        serde_json::from_str(&contents)
            .map_err(|err| DeviceError::Config(format!("Failed to parse config.json: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureKind;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"device_url": "http://192.168.4.1", "poll_interval_ms": 5000}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).await.unwrap();
        assert_eq!(config.device_url, "http://192.168.4.1");
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.confirm_delay_ms, 100);
    }

    #[tokio::test]
    async fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = Config::load_from(file.path()).await.unwrap_err();
        assert!(matches!(err, DeviceError::Config(_)));
    }

    #[tokio::test]
    async fn unreadable_file_is_an_io_error() {
        // A directory exists but cannot be read as a file.
        let dir = tempfile::tempdir().unwrap();

        let err = Config::load_from(dir.path()).await.unwrap_err();
        assert!(matches!(err, DeviceError::Io(_)));
        assert_eq!(err.kind(), FailureKind::Local);
    }
}
