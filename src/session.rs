use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::device_client::{ConnectivitySnapshot, MessagingInfo, NetworkInfo, RelayCollection, RelayId};
use crate::store::{PendingToggle, RelayStateStore};

/// Lifecycle of a dashboard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Polling and accepting commands.
    Active,
    /// Factory reset accepted by the device. Terminal.
    Restarting,
    /// Torn down by the user or the process. Terminal.
    Closed,
}

impl SessionPhase {
    pub fn is_active(self) -> bool {
        matches!(self, SessionPhase::Active)
    }
}

/// Consistent copy of everything the presenter needs.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub relays: RelayCollection,
    pub connectivity: ConnectivitySnapshot,
    pub phase: SessionPhase,
    pub last_sync: Option<DateTime<Utc>>,
}

struct SessionState {
    store: RelayStateStore,
    connectivity: ConnectivitySnapshot,
    phase: SessionPhase,
    last_sync: Option<DateTime<Utc>>,
}

/// Shared state of one dashboard session.
///
/// Every mutation happens under one short lock that is never held across a
/// device round trip, so updates apply whole in completion order. Device
/// results are only applied while the session is active; responses that
/// land after a reset or teardown are dropped.
pub struct SyncSession {
    state: Mutex<SessionState>,
    changes: watch::Sender<u64>,
}

impl SyncSession {
    pub fn new() -> Arc<Self> {
        let (changes, _) = watch::channel(0);
        Arc::new(Self {
            state: Mutex::new(SessionState {
                store: RelayStateStore::new(),
                connectivity: ConnectivitySnapshot::default(),
                phase: SessionPhase::Active,
                last_sync: None,
            }),
            changes,
        })
    }

    /// Receiver whose value bumps every time the rendered state may have changed.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        self.changes.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            relays: state.store.current().to_vec(),
            connectivity: state.connectivity.clone(),
            phase: state.phase,
            last_sync: state.last_sync,
        }
    }

    pub async fn relay_state(&self, id: RelayId) -> Option<bool> {
        self.state.lock().await.store.state_of(id)
    }

    /// Reconcile with a fresh poll. Returns `false` if the session already stopped.
    pub async fn apply_relays(&self, relays: RelayCollection) -> bool {
        {
            let mut state = self.state.lock().await;
            if !state.phase.is_active() {
                debug!(phase = ?state.phase, "Dropping relay poll for inactive session");
                return false;
            }
            state.store.replace_all(relays);
            state.last_sync = Some(Utc::now());
        }
        self.notify();
        true
    }

    pub async fn apply_network(&self, info: NetworkInfo) -> bool {
        {
            let mut state = self.state.lock().await;
            if !state.phase.is_active() {
                return false;
            }
            state.connectivity.network = Some(info);
        }
        self.notify();
        true
    }

    pub async fn apply_messaging(&self, info: MessagingInfo) -> bool {
        {
            let mut state = self.state.lock().await;
            if !state.phase.is_active() {
                return false;
            }
            state.connectivity.messaging = Some(info);
        }
        self.notify();
        true
    }

    /// Optimistically show relay `id` in `desired` state before the device confirms.
    pub async fn begin_toggle(&self, id: RelayId, desired: bool) -> Option<PendingToggle> {
        let pending = {
            let mut state = self.state.lock().await;
            if !state.phase.is_active() {
                return None;
            }
            state.store.apply_optimistic(id, desired)
        };
        if pending.is_some() {
            self.notify();
        }
        pending
    }

    /// The device accepted the command: show it again, whatever arrived in between.
    pub async fn reassert_toggle(&self, id: RelayId, desired: bool) -> bool {
        let applied = {
            let mut state = self.state.lock().await;
            state.phase.is_active() && state.store.apply_optimistic(id, desired).is_some()
        };
        if applied {
            self.notify();
        }
        applied
    }

    pub async fn rollback_toggle(&self, pending: &PendingToggle) -> bool {
        let reverted = {
            let mut state = self.state.lock().await;
            state.phase.is_active() && state.store.rollback(pending)
        };
        if reverted {
            self.notify();
        }
        reverted
    }

    /// Switch into the terminal post-reset phase. Only an active session can restart.
    pub async fn enter_restarting(&self) -> bool {
        let changed = {
            let mut state = self.state.lock().await;
            if state.phase.is_active() {
                state.phase = SessionPhase::Restarting;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Tear the session down. A session that is already restarting keeps that phase.
    pub async fn close(&self) {
        let changed = {
            let mut state = self.state.lock().await;
            if state.phase.is_active() {
                state.phase = SessionPhase::Closed;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
    }
}
