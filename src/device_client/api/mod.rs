mod requests;
mod responses;

pub use requests::SetRelayRequest;
pub use responses::RelaysResponse;

pub const RELAYS_PATH: &str = "/api/relays";
pub const RELAY_PATH: &str = "/api/relay";
pub const WIFI_PATH: &str = "/api/wifi";
pub const MQTT_PATH: &str = "/api/mqtt";
pub const RESET_PATH: &str = "/api/reset";
