use serde::Deserialize;

use crate::device_client::models::RelayCollection;

/// Body of `GET /api/relays`.
#[derive(Debug, Deserialize)]
pub struct RelaysResponse {
    pub relays: RelayCollection,
}
