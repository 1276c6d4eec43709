use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::device_client::{DeviceApi, MessagingInfo, RelayCollection};
use crate::session::SyncSession;
use crate::types::DeviceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Active,
    Stopped,
}

/// Which results of one poll cycle made it into the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub relays: bool,
    pub messaging: bool,
}

/// Periodic poller for relay and messaging state.
///
/// Every tick runs as its own task so a hung request only delays its own
/// update. Stopping is one-way: a stopped scheduler never polls again and a
/// new one has to be started instead. Dropping the scheduler stops it.
pub struct SyncScheduler {
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

impl SyncScheduler {
    pub fn start(client: Arc<dyn DeviceApi>, session: Arc<SyncSession>, period: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();

        let task = tokio::spawn(async move {
            polling_loop(client, session, period, task_token).await;
        });

        info!(interval_ms = period.as_millis() as u64, "Started relay polling");
        Self { cancel_token, task }
    }

    pub fn state(&self) -> SchedulerState {
        if self.cancel_token.is_cancelled() {
            SchedulerState::Stopped
        } else {
            SchedulerState::Active
        }
    }

    /// Cancel the timer. Returns `false` if it was already stopped.
    pub fn stop(&self) -> bool {
        if self.cancel_token.is_cancelled() {
            return false;
        }
        self.cancel_token.cancel();
        info!("Stopped relay polling");
        true
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn polling_loop(
    client: Arc<dyn DeviceApi>,
    session: Arc<SyncSession>,
    period: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                let client = client.clone();
                let session = session.clone();
                let token = cancel_token.clone();
                tokio::spawn(async move {
                    scheduled_tick(client.as_ref(), &session, &token).await;
                });
            }
        }
    }

    debug!("Relay polling loop exited");
}

async fn scheduled_tick(client: &dyn DeviceApi, session: &SyncSession, cancel_token: &CancellationToken) {
    let (relays, messaging) = tokio::join!(client.fetch_relays(), client.fetch_messaging_info());
    if cancel_token.is_cancelled() {
        debug!("Discarding poll results that arrived after stop");
        return;
    }
    apply_results(session, relays, messaging).await;
}

/// Run one poll cycle right now, outside the timer.
pub async fn poll_once(client: &dyn DeviceApi, session: &SyncSession) -> TickOutcome {
    let (relays, messaging) = tokio::join!(client.fetch_relays(), client.fetch_messaging_info());
    apply_results(session, relays, messaging).await
}

async fn apply_results(
    session: &SyncSession,
    relays: Result<RelayCollection, DeviceError>,
    messaging: Result<MessagingInfo, DeviceError>,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    match relays {
        Ok(relays) => outcome.relays = session.apply_relays(relays).await,
        Err(err) => warn!(kind = ?err.kind(), error = %err, "Failed to poll relays"),
    }
    match messaging {
        Ok(info) => outcome.messaging = session.apply_messaging(info).await,
        Err(err) => warn!(kind = ?err.kind(), error = %err, "Failed to poll MQTT status"),
    }

    outcome
}
