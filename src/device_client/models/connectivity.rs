use serde::{Deserialize, Serialize};

/// WiFi association details reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub ssid: String,
    pub ip: String,
    pub hostname: String,
    /// Received signal strength in dBm.
    pub rssi: i32,
}

/// MQTT broker connection details reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingInfo {
    pub connected: bool,
    #[serde(default)]
    pub server: Option<String>,
    /// Passed through unchecked; the firmware does not validate it.
    #[serde(default)]
    pub port: Option<i64>,
}

/// Last known mirror of both connectivity facets. Either may not have arrived yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivitySnapshot {
    pub network: Option<NetworkInfo>,
    pub messaging: Option<MessagingInfo>,
}
