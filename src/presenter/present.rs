use chrono::{DateTime, TimeDelta, Utc};

use crate::device_client::{MessagingInfo, NetworkInfo, Relay};
use crate::session::{SessionPhase, SessionSnapshot};

use super::signal::SignalQuality;
use super::view::{
    DashboardView, MessagingSection, NetworkSection, RelayCard, RelayPanel, RestartingView,
    ToggleAction, ViewModel, LOADING_RELAYS, PLACEHOLDER, SERVER_NOT_CONFIGURED,
    SETUP_NETWORK_NAME,
};

/// Build the view model for a session snapshot. `now` only feeds the staleness label.
pub fn present(snapshot: &SessionSnapshot, now: DateTime<Utc>) -> ViewModel {
    if snapshot.phase == SessionPhase::Restarting {
        return ViewModel::Restarting(restarting_view());
    }

    ViewModel::Dashboard(DashboardView {
        relays: relay_panel(&snapshot.relays),
        network: network_section(snapshot.connectivity.network.as_ref()),
        messaging: messaging_section(snapshot.connectivity.messaging.as_ref()),
        last_updated: snapshot
            .last_sync
            .map(|synced| format_age(now.signed_duration_since(synced))),
    })
}

pub fn restarting_view() -> RestartingView {
    RestartingView {
        title: "Device Restarting...".to_string(),
        message: format!("Please connect to \"{SETUP_NETWORK_NAME}\" WiFi to reconfigure."),
        setup_network: SETUP_NETWORK_NAME.to_string(),
    }
}

pub fn relay_panel(relays: &[Relay]) -> RelayPanel {
    if relays.is_empty() {
        return RelayPanel::Loading {
            message: LOADING_RELAYS.to_string(),
        };
    }
    RelayPanel::Cards {
        cards: relays.iter().map(relay_card).collect(),
    }
}

fn relay_card(relay: &Relay) -> RelayCard {
    RelayCard {
        id: relay.id,
        name: relay.name.clone(),
        badge: format!("R{}", relay.id),
        pin_label: format!("GPIO Pin: {}", relay.pin),
        state_label: if relay.state { "ON" } else { "OFF" }.to_string(),
        highlighted: relay.state,
        button_label: if relay.state { "Turn OFF" } else { "Turn ON" }.to_string(),
        action: ToggleAction {
            relay: relay.id,
            state: !relay.state,
        },
    }
}

pub fn network_section(info: Option<&NetworkInfo>) -> NetworkSection {
    match info {
        Some(info) => NetworkSection {
            ssid: info.ssid.clone(),
            ip: info.ip.clone(),
            hostname: info.hostname.clone(),
            rssi: format!("{} dBm", info.rssi),
            signal: Some(SignalQuality::from_rssi(info.rssi)),
        },
        None => NetworkSection {
            ssid: PLACEHOLDER.to_string(),
            ip: PLACEHOLDER.to_string(),
            hostname: PLACEHOLDER.to_string(),
            rssi: PLACEHOLDER.to_string(),
            signal: None,
        },
    }
}

pub fn messaging_section(info: Option<&MessagingInfo>) -> MessagingSection {
    let Some(info) = info else {
        return MessagingSection {
            status: PLACEHOLDER.to_string(),
            connected: false,
            server: SERVER_NOT_CONFIGURED.to_string(),
            port: PLACEHOLDER.to_string(),
        };
    };

    // The device reports an unset broker as "" and port 0; negative ports are unset too.
    let server = info
        .server
        .as_deref()
        .map(str::trim)
        .filter(|server| !server.is_empty())
        .unwrap_or(SERVER_NOT_CONFIGURED)
        .to_string();
    let port = info
        .port
        .filter(|port| *port > 0)
        .map(|port| port.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    MessagingSection {
        status: if info.connected { "Connected" } else { "Disconnected" }.to_string(),
        connected: info.connected,
        server,
        port,
    }
}

pub fn format_age(elapsed: TimeDelta) -> String {
    let seconds = elapsed.num_seconds();
    if seconds < 5 {
        "just now".to_string()
    } else if seconds < 60 {
        format!("{seconds} s ago")
    } else if elapsed.num_minutes() < 60 {
        format!("{} min ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{} h ago", elapsed.num_hours())
    } else {
        format!("{} d ago", elapsed.num_days())
    }
}
