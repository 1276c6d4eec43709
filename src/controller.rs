use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::commands::{UserCommand, HELP};
use crate::config::Config;
use crate::device_client::{DeviceApi, RelayId};
use crate::reset::{Confirm, ResetFlow, ResetOutcome};
use crate::scheduler::{poll_once, SyncScheduler};
use crate::session::SyncSession;
use crate::types::DeviceError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("the session is no longer active")]
    Inactive,
    #[error("relay {0} is not known yet")]
    UnknownRelay(RelayId),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// What the caller should tell the user after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Silent,
    Info(String),
    Alert(String),
    Quit,
}

/// Owns one dashboard session: its shared state, the poller and the command paths.
pub struct RelayController {
    client: Arc<dyn DeviceApi>,
    session: Arc<SyncSession>,
    scheduler: SyncScheduler,
    confirm_delay: Duration,
}

impl RelayController {
    /// Create a session, fetch network info once and start polling.
    pub fn start(client: Arc<dyn DeviceApi>, config: &Config) -> Self {
        let session = SyncSession::new();

        let network_client = client.clone();
        let network_session = session.clone();
        tokio::spawn(async move {
            load_network_info(network_client.as_ref(), &network_session).await;
        });

        let scheduler = SyncScheduler::start(client.clone(), session.clone(), config.poll_interval());

        Self {
            client,
            session,
            scheduler,
            confirm_delay: config.confirm_delay(),
        }
    }

    pub fn session(&self) -> &Arc<SyncSession> {
        &self.session
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }

    /// Drive relay `id` into `desired`, showing the result before the device confirms.
    ///
    /// On success the state is shown again and one confirmation poll follows
    /// shortly after. On failure the optimistic state is withdrawn unless a
    /// poll already replaced it.
    pub async fn set_relay(&self, id: RelayId, desired: bool) -> Result<(), CommandError> {
        if !self.session.phase().await.is_active() {
            return Err(CommandError::Inactive);
        }

        let pending = self.session.begin_toggle(id, desired).await;

        match self.client.set_relay(id, desired).await {
            Ok(()) => {
                info!(relay = id, state = desired, "Relay switched");
                self.session.reassert_toggle(id, desired).await;
                self.schedule_confirmation();
                Ok(())
            }
            Err(err) => {
                error!(
                    relay = id,
                    state = desired,
                    kind = ?err.kind(),
                    error = %err,
                    "Failed to toggle relay"
                );
                if let Some(pending) = pending {
                    if self.session.rollback_toggle(&pending).await {
                        debug!(relay = id, "Rolled back optimistic relay state");
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Switch relay `id` to the opposite of its currently shown state.
    pub async fn toggle(&self, id: RelayId) -> Result<(), CommandError> {
        let current = self
            .session
            .relay_state(id)
            .await
            .ok_or(CommandError::UnknownRelay(id))?;
        self.set_relay(id, !current).await
    }

    pub async fn refresh(&self) -> Result<(), CommandError> {
        if !self.session.phase().await.is_active() {
            return Err(CommandError::Inactive);
        }
        let outcome = poll_once(self.client.as_ref(), &self.session).await;
        load_network_info(self.client.as_ref(), &self.session).await;
        debug!(?outcome, "Manual refresh finished");
        Ok(())
    }

    pub async fn reset<C>(&self, confirmer: &mut C) -> ResetOutcome
    where
        C: Confirm + ?Sized,
    {
        ResetFlow::new(self.client.as_ref(), &self.session, &self.scheduler)
            .run(confirmer)
            .await
    }

    /// Teardown: stop polling and drop whatever is still in flight.
    pub async fn shutdown(&self) {
        self.scheduler.stop();
        self.session.close().await;
    }

    pub async fn handle<C>(&self, command: UserCommand, confirmer: &mut C) -> Reply
    where
        C: Confirm + ?Sized,
    {
        match command {
            UserCommand::SetRelay { relay, state } => command_reply(relay, self.set_relay(relay, state).await),
            UserCommand::Toggle { relay } => command_reply(relay, self.toggle(relay).await),
            UserCommand::Refresh => match self.refresh().await {
                Ok(()) => Reply::Silent,
                Err(err) => Reply::Info(format!("Refresh skipped: {err}")),
            },
            UserCommand::Reset => match self.reset(confirmer).await {
                outcome @ ResetOutcome::Failed(_) => {
                    Reply::Alert(outcome.message().unwrap_or_default())
                }
                outcome => outcome.message().map(Reply::Info).unwrap_or(Reply::Silent),
            },
            UserCommand::Help => Reply::Info(HELP.to_string()),
            UserCommand::Quit => {
                self.shutdown().await;
                Reply::Quit
            }
        }
    }

    /// Like [`handle`](Self::handle), but tear the session down as soon as
    /// `interrupt` resolves, even while a request or prompt is outstanding.
    pub async fn handle_until<C, F>(
        &self,
        command: UserCommand,
        confirmer: &mut C,
        interrupt: F,
    ) -> Reply
    where
        C: Confirm + ?Sized,
        F: Future,
    {
        tokio::select! {
            biased;
            _ = interrupt => {
                info!(?command, "Interrupted, shutting down");
                self.shutdown().await;
                Reply::Quit
            }
            reply = self.handle(command, confirmer) => reply,
        }
    }

    fn schedule_confirmation(&self) {
        let client = self.client.clone();
        let session = self.session.clone();
        let delay = self.confirm_delay;
        tokio::spawn(async move {
            time::sleep(delay).await;
            if !session.phase().await.is_active() {
                return;
            }
            match client.fetch_relays().await {
                Ok(relays) => {
                    session.apply_relays(relays).await;
                }
                Err(err) => warn!(error = %err, "Confirmation poll failed"),
            }
        });
    }
}

fn command_reply(relay: RelayId, result: Result<(), CommandError>) -> Reply {
    match result {
        Ok(()) => Reply::Silent,
        Err(CommandError::Device(err)) => Reply::Alert(format!("Failed to toggle relay {relay}: {err}")),
        Err(err) => Reply::Info(err.to_string()),
    }
}

async fn load_network_info(client: &dyn DeviceApi, session: &SyncSession) {
    match client.fetch_network_info().await {
        Ok(info) => {
            session.apply_network(info).await;
        }
        Err(err) => warn!(error = %err, "Failed to load WiFi info"),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::device_client::Relay;
    use crate::presenter::{present, RelayPanel, ViewModel};
    use crate::scheduler::SchedulerState;
    use crate::session::SessionPhase;
    use crate::testing::{Call, FakeDevice};

    struct AlwaysYes;

    #[async_trait]
    impl Confirm for AlwaysYes {
        async fn confirm(&mut self, _prompt: &str) -> bool {
            true
        }
    }

    fn controller(device: &Arc<FakeDevice>) -> RelayController {
        let client: Arc<dyn DeviceApi> = device.clone();
        RelayController::start(client, &Config::default())
    }

    async fn shown_state(controller: &RelayController, id: RelayId) -> Option<String> {
        let snapshot = controller.session().snapshot().await;
        let ViewModel::Dashboard(view) = present(&snapshot, Utc::now()) else {
            return None;
        };
        let RelayPanel::Cards { cards } = view.relays else {
            return None;
        };
        cards
            .into_iter()
            .find(|card| card.id == id)
            .map(|card| card.state_label)
    }

    #[tokio::test(start_paused = true)]
    async fn start_loads_relays_network_and_messaging() {
        let device = Arc::new(FakeDevice::pump());
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let snapshot = controller.session().snapshot().await;
        assert_eq!(snapshot.relays, vec![Relay::new(1, "Pump", 5, false)]);
        assert!(snapshot.connectivity.network.is_some());
        assert!(snapshot.connectivity.messaging.is_some());

        // Network info is not part of the periodic poll.
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(device.count(Call::FetchNetwork), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn optimistic_state_shows_while_command_is_pending() {
        let device = Arc::new(FakeDevice::pump());
        let gate = device.hold_commands();
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("OFF"));

        let command = controller.set_relay(1, true);
        tokio::pin!(command);
        tokio::select! {
            _ = &mut command => panic!("command finished before the device answered"),
            _ = time::sleep(Duration::from_millis(10)) => {}
        }
        assert_eq!(device.calls().last(), Some(&Call::SetRelay(1, true)));
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("ON"));

        gate.notify_one();
        command.await.unwrap();
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("ON"));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_during_command_is_overridden_by_its_response() {
        let device = Arc::new(FakeDevice::pump());
        let gate = device.hold_commands();
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let command = controller.set_relay(1, true);
        tokio::pin!(command);
        tokio::select! {
            _ = &mut command => panic!("command finished before the device answered"),
            _ = time::sleep(Duration::from_millis(10)) => {}
        }
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("ON"));

        // The device has not switched yet, so the next tick reports OFF.
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("OFF"));

        // The late success response wins over that poll.
        gate.notify_one();
        command.await.unwrap();
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("ON"));

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("ON"));
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_tears_down_during_a_pending_command() {
        let device = Arc::new(FakeDevice::pump());
        let _gate = device.hold_commands();
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let reply = controller
            .handle_until(
                UserCommand::SetRelay { relay: 1, state: true },
                &mut AlwaysYes,
                time::sleep(Duration::from_secs(1)),
            )
            .await;

        assert_eq!(reply, Reply::Quit);
        assert_eq!(controller.session().phase().await, SessionPhase::Closed);
        assert_eq!(controller.scheduler().state(), SchedulerState::Stopped);

        let calls = device.calls().len();
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(device.calls().len(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_tears_down_during_the_reset_prompt() {
        struct NeverAnswers;

        #[async_trait]
        impl Confirm for NeverAnswers {
            async fn confirm(&mut self, _prompt: &str) -> bool {
                std::future::pending().await
            }
        }

        let device = Arc::new(FakeDevice::pump());
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let reply = controller
            .handle_until(
                UserCommand::Reset,
                &mut NeverAnswers,
                time::sleep(Duration::from_secs(1)),
            )
            .await;

        assert_eq!(reply, Reply::Quit);
        assert_eq!(controller.session().phase().await, SessionPhase::Closed);
        assert_eq!(device.count(Call::FactoryReset), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_until_returns_the_reply_when_not_interrupted() {
        let device = Arc::new(FakeDevice::pump());
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let reply = controller
            .handle_until(UserCommand::Help, &mut AlwaysYes, std::future::pending::<()>())
            .await;

        assert_eq!(reply, Reply::Info(HELP.to_string()));
        assert_eq!(controller.session().phase().await, SessionPhase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_toggle_is_confirmed_by_an_early_poll() {
        let device = Arc::new(FakeDevice::pump());
        let controller = controller(&device);
        time::sleep(Duration::from_millis(500)).await;
        let polls = device.count(Call::FetchRelays);

        controller.set_relay(1, true).await.unwrap();
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("ON"));
        assert_eq!(device.calls().last(), Some(&Call::SetRelay(1, true)));

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(device.count(Call::FetchRelays), polls + 1);
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("ON"));
    }

    #[tokio::test(start_paused = true)]
    async fn device_truth_wins_after_successful_toggle() {
        let device = Arc::new(FakeDevice::pump());
        let controller = controller(&device);
        time::sleep(Duration::from_millis(500)).await;

        controller.set_relay(1, true).await.unwrap();
        device.set_device_relays(vec![Relay::new(1, "Pump", 5, false)]);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("OFF"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_toggle_is_rolled_back() {
        let device = Arc::new(FakeDevice::pump());
        device.reject_commands();
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let err = controller.set_relay(1, true).await.unwrap_err();
        assert!(matches!(err, CommandError::Device(_)));
        assert_eq!(shown_state(&controller, 1).await.as_deref(), Some("OFF"));

        let reply = controller
            .handle(UserCommand::Toggle { relay: 1 }, &mut AlwaysYes)
            .await;
        assert!(matches!(reply, Reply::Alert(ref text) if text.starts_with("Failed to toggle relay 1")));
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_flips_the_shown_state() {
        let device = Arc::new(FakeDevice::with_relays(vec![
            Relay::new(1, "Pump", 5, false),
            Relay::new(2, "Lights", 12, true),
        ]));
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        controller.toggle(2).await.unwrap();
        assert!(device.calls().contains(&Call::SetRelay(2, false)));
        assert_eq!(shown_state(&controller, 2).await.as_deref(), Some("OFF"));
    }

    #[tokio::test(start_paused = true)]
    async fn toggling_an_unknown_relay_sends_nothing() {
        let device = Arc::new(FakeDevice::pump());
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let err = controller.toggle(7).await.unwrap_err();
        assert!(matches!(err, CommandError::UnknownRelay(7)));
        assert!(!device.calls().iter().any(|call| matches!(call, Call::SetRelay(..))));
    }

    #[tokio::test(start_paused = true)]
    async fn no_commands_after_reset() {
        let device = Arc::new(FakeDevice::pump());
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let reply = controller.handle(UserCommand::Reset, &mut AlwaysYes).await;
        assert!(matches!(reply, Reply::Info(ref text) if text.contains("ESP32-Relay-Setup")));
        assert_eq!(controller.scheduler().state(), SchedulerState::Stopped);

        let calls = device.calls().len();
        assert!(matches!(
            controller.set_relay(1, true).await,
            Err(CommandError::Inactive)
        ));
        assert!(matches!(controller.refresh().await, Err(CommandError::Inactive)));
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(device.calls().len(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reset_raises_an_alert() {
        let device = Arc::new(FakeDevice::pump());
        device.reject_reset();
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let reply = controller.handle(UserCommand::Reset, &mut AlwaysYes).await;
        assert_eq!(
            reply,
            Reply::Alert("Failed to reset configuration. Please try again.".to_string())
        );
        assert_eq!(controller.session().phase().await, SessionPhase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_tears_the_session_down() {
        let device = Arc::new(FakeDevice::pump());
        let controller = controller(&device);
        time::sleep(Duration::from_millis(50)).await;

        let reply = controller.handle(UserCommand::Quit, &mut AlwaysYes).await;
        assert_eq!(reply, Reply::Quit);
        assert_eq!(controller.session().phase().await, SessionPhase::Closed);

        let calls = device.calls().len();
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(device.calls().len(), calls);
    }
}
