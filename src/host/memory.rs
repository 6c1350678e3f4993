//! Single-threaded in-memory host: a state map plus a subscription list.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::{
    EntityPublisher, EntityRecord, SourceCallback, SourceEvents, StateLookup, SubscriptionId,
};
use crate::source::SourceState;

struct Subscription {
    id: SubscriptionId,
    entity_id: String,
    callback: SourceCallback,
}

/// Holds entity states and dispatches change callbacks synchronously.
///
/// Writing a state with [`InMemoryHost::set_state`] runs every callback
/// subscribed to that entity before returning. Records published from
/// inside a callback are stored but do not trigger further callbacks.
#[derive(Default)]
pub struct InMemoryHost {
    states: BTreeMap<String, EntityRecord>,
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` and notifies subscribers of its entity.
    pub fn set_state(&mut self, record: EntityRecord) {
        let entity_id = record.entity_id.clone();
        trace!(entity_id = %entity_id, state = %record.state, "state changed");
        self.states.insert(entity_id.clone(), record);
        self.notify(&entity_id);
    }

    /// Convenience for writing a raw source reading.
    pub fn set_source(&mut self, entity_id: &str, source: SourceState) {
        self.set_state(EntityRecord::from_source(entity_id, &source));
    }

    /// Removes an entity and notifies subscribers with `None`.
    pub fn remove(&mut self, entity_id: &str) -> Option<EntityRecord> {
        let removed = self.states.remove(entity_id);
        if removed.is_some() {
            debug!(entity_id, "entity removed");
            self.notify(entity_id);
        }
        removed
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityRecord> {
        self.states.get(entity_id)
    }

    /// All entities, ordered by entity id.
    pub fn states(&self) -> impl Iterator<Item = &EntityRecord> {
        self.states.values()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn notify(&mut self, entity_id: &str) {
        let source = self.states.get(entity_id).map(EntityRecord::to_source_state);
        let Self {
            states,
            subscriptions,
            ..
        } = self;
        let mut writer = StateWriter { states };
        for sub in subscriptions
            .iter_mut()
            .filter(|sub| sub.entity_id == entity_id)
        {
            (sub.callback)(source.as_ref(), &mut writer);
        }
    }
}

/// Publisher handed to callbacks; writes straight into the state map.
struct StateWriter<'a> {
    states: &'a mut BTreeMap<String, EntityRecord>,
}

impl EntityPublisher for StateWriter<'_> {
    fn publish(&mut self, record: EntityRecord) {
        self.states.insert(record.entity_id.clone(), record);
    }
}

impl EntityPublisher for InMemoryHost {
    fn publish(&mut self, record: EntityRecord) {
        self.states.insert(record.entity_id.clone(), record);
    }
}

impl SourceEvents for InMemoryHost {
    fn subscribe_to_source_changes(
        &mut self,
        entity_id: &str,
        callback: SourceCallback,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        debug!(entity_id, subscription = id.0, "subscribed to source changes");
        self.subscriptions.push(Subscription {
            id,
            entity_id: entity_id.to_string(),
            callback,
        });
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        before != self.subscriptions.len()
    }

    fn source_state(&self, entity_id: &str) -> Option<SourceState> {
        self.states.get(entity_id).map(EntityRecord::to_source_state)
    }
}

impl StateLookup for InMemoryHost {
    fn entity(&self, entity_id: &str) -> Option<&EntityRecord> {
        self.get(entity_id)
    }
}
