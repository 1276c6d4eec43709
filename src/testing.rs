//! In-memory device used by the session-level tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::device_client::{DeviceApi, MessagingInfo, NetworkInfo, Relay, RelayCollection, RelayId};
use crate::types::DeviceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    FetchRelays,
    SetRelay(RelayId, bool),
    FetchNetwork,
    FetchMessaging,
    FactoryReset,
}

struct FakeState {
    relays: RelayCollection,
    failing_relay_polls: u32,
    reject_commands: bool,
    reject_reset: bool,
    command_gate: Option<Arc<Notify>>,
    calls: Vec<Call>,
}

pub struct FakeDevice {
    state: Mutex<FakeState>,
}

pub fn unavailable(path: &str) -> DeviceError {
    DeviceError::Status {
        path: path.to_string(),
        status: StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl FakeDevice {
    pub fn with_relays(relays: RelayCollection) -> Self {
        Self {
            state: Mutex::new(FakeState {
                relays,
                failing_relay_polls: 0,
                reject_commands: false,
                reject_reset: false,
                command_gate: None,
                calls: Vec::new(),
            }),
        }
    }

    pub fn pump() -> Self {
        Self::with_relays(vec![Relay::new(1, "Pump", 5, false)])
    }

    pub fn set_device_relays(&self, relays: RelayCollection) {
        self.state.lock().unwrap().relays = relays;
    }

    pub fn fail_next_relay_polls(&self, count: u32) {
        self.state.lock().unwrap().failing_relay_polls = count;
    }

    pub fn reject_commands(&self) {
        self.state.lock().unwrap().reject_commands = true;
    }

    pub fn reject_reset(&self) {
        self.state.lock().unwrap().reject_reset = true;
    }

    /// Hold every relay command until the returned gate is notified once per command.
    pub fn hold_commands(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().command_gate = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl DeviceApi for FakeDevice {
    async fn fetch_relays(&self) -> Result<RelayCollection, DeviceError> {
        self.record(Call::FetchRelays);
        let mut state = self.state.lock().unwrap();
        if state.failing_relay_polls > 0 {
            state.failing_relay_polls -= 1;
            return Err(unavailable("/api/relays"));
        }
        Ok(state.relays.clone())
    }

    async fn set_relay(&self, id: RelayId, desired: bool) -> Result<(), DeviceError> {
        self.record(Call::SetRelay(id, desired));
        let gate = self.state.lock().unwrap().command_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut state = self.state.lock().unwrap();
        if state.reject_commands {
            return Err(unavailable("/api/relay"));
        }
        if let Some(relay) = state.relays.iter_mut().find(|relay| relay.id == id) {
            relay.state = desired;
        }
        Ok(())
    }

    async fn fetch_network_info(&self) -> Result<NetworkInfo, DeviceError> {
        self.record(Call::FetchNetwork);
        Ok(NetworkInfo {
            ssid: "greenhouse".to_string(),
            ip: "192.168.1.40".to_string(),
            hostname: "esp32-relay.local".to_string(),
            rssi: -55,
        })
    }

    async fn fetch_messaging_info(&self) -> Result<MessagingInfo, DeviceError> {
        self.record(Call::FetchMessaging);
        Ok(MessagingInfo {
            connected: true,
            server: Some("192.168.1.2".to_string()),
            port: Some(1883),
        })
    }

    async fn request_factory_reset(&self) -> Result<(), DeviceError> {
        self.record(Call::FactoryReset);
        if self.state.lock().unwrap().reject_reset {
            return Err(unavailable("/api/reset"));
        }
        Ok(())
    }
}
