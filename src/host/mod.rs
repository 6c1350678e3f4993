//! Host ports: how the sensor publishes entities and hears about source changes.
//!
//! The engine never touches these; the sensor layer drives them. Any host
//! (a home-automation runtime, a test double, the bundled [`InMemoryHost`])
//! implements [`EntityPublisher`] and [`SourceEvents`].

mod memory;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::source::SourceState;

pub use memory::InMemoryHost;

/// State of a published entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityState {
    /// Numeric reading.
    Value(f64),
    /// Free-form state string.
    Text(String),
    /// Never computed yet.
    Unknown,
    /// Computation failed this tick; recovers on the next source update.
    Unavailable,
}

impl EntityState {
    /// Parses a raw host state string; the `unknown` and `unavailable`
    /// placeholders map to their variants.
    pub fn from_raw(state: &str) -> Self {
        match state.trim() {
            "unknown" => Self::Unknown,
            "unavailable" => Self::Unavailable,
            _ => Self::Text(state.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unknown | Self::Unavailable)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Unknown | Self::Unavailable => None,
        }
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Unknown => f.write_str("unknown"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

impl Serialize for EntityState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            other => serializer.collect_str(other),
        }
    }
}

/// One entity as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub entity_id: String,
    pub state: EntityState,
    pub unit_of_measurement: Option<String>,
    pub friendly_name: Option<String>,
    pub icon: Option<String>,
    pub attributes: BTreeMap<String, Value>,
}

impl EntityRecord {
    /// A record with only an id and a state.
    pub fn new(entity_id: impl Into<String>, state: EntityState) -> Self {
        Self {
            entity_id: entity_id.into(),
            state,
            unit_of_measurement: None,
            friendly_name: None,
            icon: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Builds a source-style record from a raw state string and unit.
    pub fn from_source(entity_id: impl Into<String>, source: &SourceState) -> Self {
        let mut record = Self::new(entity_id, EntityState::from_raw(&source.state));
        record.unit_of_measurement = source.unit.clone();
        record
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measurement = Some(unit.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// The record as the source reader sees it.
    pub fn to_source_state(&self) -> SourceState {
        SourceState {
            state: self.state.to_string(),
            unit: self.unit_of_measurement.clone(),
        }
    }
}

/// Writes entity states into the host.
pub trait EntityPublisher {
    fn publish(&mut self, record: EntityRecord);
}

/// Handle returned by [`SourceEvents::subscribe_to_source_changes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Invoked with the new source state (`None` when the entity was removed).
pub type SourceCallback = Box<dyn FnMut(Option<&SourceState>, &mut dyn EntityPublisher)>;

/// Push-based notification of source entity changes.
pub trait SourceEvents {
    /// Registers `callback` for every state change of `entity_id`.
    fn subscribe_to_source_changes(
        &mut self,
        entity_id: &str,
        callback: SourceCallback,
    ) -> SubscriptionId;

    /// Drops a subscription. Returns `false` if it was already gone.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Current state of a source entity, if it exists.
    fn source_state(&self, entity_id: &str) -> Option<SourceState>;
}

/// Read access to published entities, used by the dashboard card.
pub trait StateLookup {
    fn entity(&self, entity_id: &str) -> Option<&EntityRecord>;
}

impl StateLookup for BTreeMap<String, EntityRecord> {
    fn entity(&self, entity_id: &str) -> Option<&EntityRecord> {
        self.get(entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_states_are_not_available() {
        assert!(!EntityState::Unknown.is_available());
        assert!(!EntityState::Unavailable.is_available());
        assert!(EntityState::Value(0.0).is_available());
    }

    #[test]
    fn source_placeholders_become_unavailable_states() {
        let down = EntityRecord::from_source("sensor.pv", &SourceState::new("unavailable", Some("kW")));
        assert_eq!(down.state, EntityState::Unavailable);
        assert!(!down.state.is_available());

        let unknown = EntityRecord::from_source("sensor.pv", &SourceState::new("unknown", None));
        assert_eq!(unknown.state, EntityState::Unknown);
        assert_eq!(unknown.to_source_state().state, "unknown");

        let up = EntityRecord::from_source("sensor.pv", &SourceState::new("2.5", Some("kW")));
        assert_eq!(up.state, EntityState::Text("2.5".into()));
        assert!(up.state.is_available());
    }

    #[test]
    fn text_state_parses_as_number() {
        assert_eq!(EntityState::Text(" 4.5 ".into()).as_f64(), Some(4.5));
        assert_eq!(EntityState::Text("sunny".into()).as_f64(), None);
    }

    #[test]
    fn source_round_trip_keeps_state_and_unit() {
        let source = SourceState::new("3.2", Some("kW"));
        let record = EntityRecord::from_source("sensor.pv", &source);
        assert_eq!(record.to_source_state(), source);
    }

    #[test]
    fn unavailable_displays_host_keyword() {
        assert_eq!(EntityState::Unavailable.to_string(), "unavailable");
    }
}
