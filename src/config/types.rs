use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Polling faster than this only floods the device's web server.
const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Configuration for the relay dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_device_url")]
    pub device_url: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,

    /// Per-request timeout. Unset leaves the transport default in place.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_url: default_device_url(),
            poll_interval_ms: default_poll_interval_ms(),
            confirm_delay_ms: default_confirm_delay_ms(),
            request_timeout_secs: None,
        }
    }
}

fn default_device_url() -> String {
    "http://esp32-relay.local".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_confirm_delay_ms() -> u64 {
    100
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.confirm_delay(), Duration::from_millis(100));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn poll_interval_is_floored() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }
}
