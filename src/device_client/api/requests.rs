use serde::Serialize;

use crate::device_client::models::RelayId;

/// Body of `POST /api/relay`.
#[derive(Debug, Serialize)]
pub struct SetRelayRequest {
    pub relay: RelayId,
    pub state: bool,
}
