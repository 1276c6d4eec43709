use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::types::DeviceError;

use super::api::{
    RelaysResponse, SetRelayRequest, MQTT_PATH, RELAYS_PATH, RELAY_PATH, RESET_PATH, WIFI_PATH,
};
use super::helpers::{join_url, normalize_base_url};
use super::models::{MessagingInfo, NetworkInfo, RelayCollection, RelayId};

/// Request/response operations the relay device exposes.
///
/// Every call is one independent round trip. None of them retry.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    async fn fetch_relays(&self) -> Result<RelayCollection, DeviceError>;

    /// Command a relay into `state`. Only the response status is inspected.
    async fn set_relay(&self, id: RelayId, state: bool) -> Result<(), DeviceError>;

    async fn fetch_network_info(&self) -> Result<NetworkInfo, DeviceError>;

    async fn fetch_messaging_info(&self) -> Result<MessagingInfo, DeviceError>;

    /// Wipe WiFi/MQTT settings. The device restarts into its setup network shortly after.
    async fn request_factory_reset(&self) -> Result<(), DeviceError>;
}

/// HTTP client for the relay device's JSON API.
#[derive(Clone)]
pub struct DeviceClient {
    http: Client,
    base_url: String,
}

impl DeviceClient {
    /// Prepare an HTTP client for the device named in the configuration.
    pub fn new(config: &Config) -> Result<Self, DeviceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(DeviceError::Transport)?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&config.device_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, DeviceError>
    where
        T: DeserializeOwned,
    {
        let url = join_url(&self.base_url, path);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(DeviceError::Transport)?;
        let response = ensure_success(path, response)?;

        let body = response.bytes().await.map_err(DeviceError::Transport)?;
        serde_json::from_slice(&body).map_err(|source| DeviceError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn post<B>(&self, path: &str, body: Option<&B>) -> Result<(), DeviceError>
    where
        B: Serialize + ?Sized,
    {
        let url = join_url(&self.base_url, path);
        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(DeviceError::Transport)?;
        ensure_success(path, response)?;
        Ok(())
    }
}

#[async_trait]
impl DeviceApi for DeviceClient {
    async fn fetch_relays(&self) -> Result<RelayCollection, DeviceError> {
        let response: RelaysResponse = self.get_json(RELAYS_PATH).await?;
        debug!(count = response.relays.len(), "Fetched relays");
        Ok(response.relays)
    }

    async fn set_relay(&self, id: RelayId, state: bool) -> Result<(), DeviceError> {
        let body = SetRelayRequest { relay: id, state };
        self.post(RELAY_PATH, Some(&body)).await
    }

    async fn fetch_network_info(&self) -> Result<NetworkInfo, DeviceError> {
        self.get_json(WIFI_PATH).await
    }

    async fn fetch_messaging_info(&self) -> Result<MessagingInfo, DeviceError> {
        self.get_json(MQTT_PATH).await
    }

    async fn request_factory_reset(&self) -> Result<(), DeviceError> {
        self.post::<()>(RESET_PATH, None).await
    }
}

fn ensure_success(path: &str, response: Response) -> Result<Response, DeviceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(DeviceError::Status {
            path: path.to_string(),
            status,
        });
    }
    Ok(response)
}
