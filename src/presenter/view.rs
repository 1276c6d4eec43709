use serde::Serialize;

use crate::device_client::RelayId;

use super::signal::SignalQuality;

/// WiFi network the device opens after a factory reset.
pub const SETUP_NETWORK_NAME: &str = "ESP32-Relay-Setup";

pub const PLACEHOLDER: &str = "--";
pub const LOADING_RELAYS: &str = "Loading relays...";
pub const SERVER_NOT_CONFIGURED: &str = "Not configured";

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    Dashboard(DashboardView),
    Restarting(RestartingView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub relays: RelayPanel,
    pub network: NetworkSection,
    pub messaging: MessagingSection,
    /// Age of the last successful relay poll, e.g. `just now`.
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelayPanel {
    /// No relay poll has succeeded yet.
    Loading { message: String },
    Cards { cards: Vec<RelayCard> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayCard {
    pub id: RelayId,
    pub name: String,
    pub badge: String,
    pub pin_label: String,
    pub state_label: String,
    pub highlighted: bool,
    pub button_label: String,
    pub action: ToggleAction,
}

/// Command a card's button issues: drive the relay to the opposite of what it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleAction {
    pub relay: RelayId,
    pub state: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSection {
    pub ssid: String,
    pub ip: String,
    pub hostname: String,
    pub rssi: String,
    pub signal: Option<SignalQuality>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagingSection {
    pub status: String,
    pub connected: bool,
    pub server: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartingView {
    pub title: String,
    pub message: String,
    pub setup_network: String,
}
