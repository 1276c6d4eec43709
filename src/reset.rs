use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::device_client::DeviceApi;
use crate::presenter::SETUP_NETWORK_NAME;
use crate::scheduler::SyncScheduler;
use crate::session::SyncSession;
use crate::types::DeviceError;

pub const RESET_PROMPT: &str =
    "Are you sure you want to reset WiFi and MQTT configuration? The device will restart.";
pub const RESET_FAILED_MESSAGE: &str = "Failed to reset configuration. Please try again.";

/// Source of an explicit yes/no answer from the user.
#[async_trait]
pub trait Confirm: Send {
    async fn confirm(&mut self, prompt: &str) -> bool;
}

#[derive(Debug)]
pub enum ResetOutcome {
    /// The user said no. Nothing was sent.
    Declined,
    /// The session had already stopped. Nothing was sent.
    Inactive,
    /// The device accepted the reset. Polling is stopped for good.
    Completed,
    /// The device did not accept the reset. The session keeps running.
    Failed(DeviceError),
}

impl ResetOutcome {
    /// Text to show the user, if the outcome warrants one.
    pub fn message(&self) -> Option<String> {
        match self {
            ResetOutcome::Declined => None,
            ResetOutcome::Inactive => {
                Some("The session is no longer active; the device was not contacted.".to_string())
            }
            ResetOutcome::Completed => Some(format!(
                "Configuration reset. The device will restart and enter configuration mode. \
                 Connect to the WiFi network \"{SETUP_NETWORK_NAME}\" to reconfigure."
            )),
            ResetOutcome::Failed(_) => Some(RESET_FAILED_MESSAGE.to_string()),
        }
    }
}

/// Confirm, reset the device, then shut synchronisation down for good.
pub struct ResetFlow<'a> {
    client: &'a dyn DeviceApi,
    session: &'a SyncSession,
    scheduler: &'a SyncScheduler,
}

impl<'a> ResetFlow<'a> {
    pub fn new(client: &'a dyn DeviceApi, session: &'a SyncSession, scheduler: &'a SyncScheduler) -> Self {
        Self {
            client,
            session,
            scheduler,
        }
    }

    pub async fn run<C>(&self, confirmer: &mut C) -> ResetOutcome
    where
        C: Confirm + ?Sized,
    {
        if !self.session.phase().await.is_active() {
            return ResetOutcome::Inactive;
        }

        if !confirmer.confirm(RESET_PROMPT).await {
            info!("Factory reset declined");
            return ResetOutcome::Declined;
        }

        match self.client.request_factory_reset().await {
            Ok(()) => {
                self.scheduler.stop();
                self.session.enter_restarting().await;
                warn!(
                    setup_network = SETUP_NETWORK_NAME,
                    "Factory reset accepted, device is restarting"
                );
                ResetOutcome::Completed
            }
            Err(err) => {
                error!(error = %err, "Failed to reset configuration");
                ResetOutcome::Failed(err)
            }
        }
    }
}
