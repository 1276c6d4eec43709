use crate::device_client::{Relay, RelayCollection, RelayId};

/// Record of an optimistic mutation, kept so a failed command can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingToggle {
    pub id: RelayId,
    pub desired: bool,
    pub previous: bool,
    generation: u64,
}

/// Last known relay collection.
///
/// `replace_all` is the reconciliation point and always overrides earlier
/// optimistic mutations. Optimistic mutations only ever touch the `state`
/// of one relay, so length and order stay as the device reported them.
#[derive(Debug, Default)]
pub struct RelayStateStore {
    relays: RelayCollection,
    generation: u64,
}

impl RelayStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, relays: RelayCollection) {
        self.relays = relays;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Set the state of relay `id` in place. Unknown ids are ignored.
    pub fn apply_optimistic(&mut self, id: RelayId, desired: bool) -> Option<PendingToggle> {
        let generation = self.generation;
        let relay = self.relays.iter_mut().find(|relay| relay.id == id)?;
        let previous = relay.state;
        relay.state = desired;
        Some(PendingToggle {
            id,
            desired,
            previous,
            generation,
        })
    }

    /// Undo an optimistic mutation whose command failed.
    ///
    /// Returns `false` when a poll has replaced the collection since, in
    /// which case the polled state stands.
    pub fn rollback(&mut self, pending: &PendingToggle) -> bool {
        if pending.generation != self.generation {
            return false;
        }
        match self.relays.iter_mut().find(|relay| relay.id == pending.id) {
            Some(relay) if relay.state == pending.desired => {
                relay.state = pending.previous;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> &[Relay] {
        &self.relays
    }

    pub fn state_of(&self, id: RelayId) -> Option<bool> {
        self.relays
            .iter()
            .find(|relay| relay.id == id)
            .map(|relay| relay.state)
    }

    pub fn is_empty(&self) -> bool {
        self.relays.is_empty()
    }
}
