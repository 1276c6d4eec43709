use serde::{Deserialize, Serialize};

/// Stable identifier the device assigns to a physical relay.
pub type RelayId = u32;

/// One remotely switched output channel as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relay {
    pub id: RelayId,
    pub name: String,
    /// GPIO pin driving the relay. Informational only.
    pub pin: u32,
    /// `true` when the relay is energized.
    pub state: bool,
}

/// Relays in device order. The order is display order.
pub type RelayCollection = Vec<Relay>;

impl Relay {
    pub fn new(id: RelayId, name: impl Into<String>, pin: u32, state: bool) -> Self {
        Self {
            id,
            name: name.into(),
            pin,
            state,
        }
    }
}
