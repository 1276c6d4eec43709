mod connectivity;
mod relay;

pub use connectivity::{ConnectivitySnapshot, MessagingInfo, NetworkInfo};
pub use relay::{Relay, RelayCollection, RelayId};
