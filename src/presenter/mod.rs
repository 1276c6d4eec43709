mod present;
mod signal;
mod text;
mod view;

pub use present::present;
pub use signal::SignalQuality;
pub use view::{
    DashboardView, MessagingSection, NetworkSection, RelayCard, RelayPanel, RestartingView,
    ToggleAction, ViewModel, SETUP_NETWORK_NAME,
};
