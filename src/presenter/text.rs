//! Plain-text rendering of the view model for terminals.

use std::fmt;

use super::view::{DashboardView, RelayPanel, RestartingView, ViewModel};

impl fmt::Display for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewModel::Dashboard(dashboard) => fmt::Display::fmt(dashboard, f),
            ViewModel::Restarting(restarting) => fmt::Display::fmt(restarting, f),
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let network = &self.network;
        let signal = network
            .signal
            .map(|quality| format!(" ({quality})"))
            .unwrap_or_default();
        writeln!(
            f,
            "WiFi {} | {} | {}{}",
            network.ssid, network.ip, network.rssi, signal
        )?;
        writeln!(
            f,
            "MQTT {} | {}:{}",
            self.messaging.status, self.messaging.server, self.messaging.port
        )?;
        writeln!(f, "Host {}", network.hostname)?;

        match &self.last_updated {
            Some(age) => writeln!(f, "Relays (updated {age})")?,
            None => writeln!(f, "Relays")?,
        }

        match &self.relays {
            RelayPanel::Loading { message } => writeln!(f, "  {message}"),
            RelayPanel::Cards { cards } => {
                for card in cards {
                    let marker = if card.highlighted { '*' } else { ' ' };
                    writeln!(
                        f,
                        "{marker} {:<4} {:<16} {:<14} {:<4} [{}]",
                        card.badge, card.name, card.pin_label, card.state_label, card.button_label
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for RestartingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.message)
    }
}
