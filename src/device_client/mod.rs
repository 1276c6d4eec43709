mod api;
mod client;
mod helpers;
mod models;

pub use client::{DeviceApi, DeviceClient};
pub use models::{ConnectivitySnapshot, MessagingInfo, NetworkInfo, Relay, RelayCollection, RelayId};
