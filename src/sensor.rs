//! Solar range sensor: wires the engine to the host's entity lifecycle.
//!
//! On attach the sensor subscribes to the PV source entity and computes
//! once from its current state. Every later source change republishes all
//! `sensor.solar_<key>` entities. Failures never escape: a transient
//! source problem publishes `unavailable` and clears on the next update.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::engine::{ComputationResult, DerivedMetricsEngine, Locale, RANGE_KEY, REGISTRY};
use crate::error::EngineError;
use crate::host::{EntityPublisher, EntityRecord, EntityState, SourceEvents, SubscriptionId};
use crate::source::{SourceState, read_source};

/// State shared between the sensor and its subscription callback.
#[derive(Debug, Clone)]
struct SensorCore {
    engine: DerivedMetricsEngine,
    pv_entity_id: String,
}

impl SensorCore {
    fn update(
        &self,
        source: Option<&SourceState>,
        publisher: &mut dyn EntityPublisher,
    ) -> Result<ComputationResult, EngineError> {
        let outcome = read_source(&self.pv_entity_id, source)
            .and_then(|input| self.engine.compute(&input));

        match &outcome {
            Ok(result) => {
                debug!(
                    pv_entity_id = %self.pv_entity_id,
                    range_km = result.range_km(),
                    "published solar range"
                );
                self.publish_result(result, publisher);
            }
            Err(err) => {
                if err.is_transient() {
                    debug!(pv_entity_id = %self.pv_entity_id, error = %err, "source unavailable");
                } else {
                    warn!(pv_entity_id = %self.pv_entity_id, error = %err, "computation refused");
                }
                self.publish_unavailable(publisher);
            }
        }
        outcome
    }

    fn publish_result(&self, result: &ComputationResult, publisher: &mut dyn EntityPublisher) {
        for metric in REGISTRY {
            let value = result.value(metric.key).unwrap_or_default();
            let mut record = EntityRecord::new(metric.entity_id(), EntityState::Value(value))
                .with_unit(metric.unit)
                .with_name(metric.name)
                .with_icon(metric.icon);
            if metric.key == RANGE_KEY {
                let mut attributes = result.attributes.clone();
                attributes.insert("calculated_at".to_string(), json!(Utc::now().to_rfc3339()));
                record = record.with_attributes(attributes);
            }
            publisher.publish(record);
        }
    }

    fn publish_unavailable(&self, publisher: &mut dyn EntityPublisher) {
        for metric in REGISTRY {
            let mut record = EntityRecord::new(metric.entity_id(), EntityState::Unavailable)
                .with_unit(metric.unit)
                .with_name(metric.name)
                .with_icon(metric.icon);
            if metric.key == RANGE_KEY {
                record = record.with_attributes(self.base_attributes());
            }
            publisher.publish(record);
        }
    }

    fn base_attributes(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("pv_entity_id".to_string(), json!(self.pv_entity_id)),
            (
                "consumption_kwh_per_100km".to_string(),
                json!(self.engine.rate().kwh_per_100km()),
            ),
        ])
    }
}

/// One configured PV-to-range sensor.
#[derive(Debug)]
pub struct SolarRangeSensor {
    core: SensorCore,
    subscription: Option<SubscriptionId>,
}

impl SolarRangeSensor {
    /// Creates a detached sensor.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] for a non-positive
    /// consumption or an empty source entity id.
    pub fn new(
        pv_entity_id: impl Into<String>,
        consumption_kwh_per_100km: f64,
        locale: Locale,
    ) -> Result<Self, EngineError> {
        let pv_entity_id = pv_entity_id.into();
        if pv_entity_id.trim().is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "pv_entity_id must not be empty".to_string(),
            ));
        }
        Ok(Self {
            core: SensorCore {
                engine: DerivedMetricsEngine::new(consumption_kwh_per_100km, locale)?,
                pv_entity_id,
            },
            subscription: None,
        })
    }

    pub fn pv_entity_id(&self) -> &str {
        &self.core.pv_entity_id
    }

    pub fn engine(&self) -> &DerivedMetricsEngine {
        &self.core.engine
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Entity ids this sensor publishes, in registry order.
    pub fn entity_ids(&self) -> Vec<String> {
        REGISTRY.iter().map(|m| m.entity_id()).collect()
    }

    /// Subscribes to the source entity and publishes an initial state.
    ///
    /// Attaching twice replaces the previous subscription.
    pub fn attach<H>(&mut self, host: &mut H) -> Result<ComputationResult, EngineError>
    where
        H: SourceEvents + EntityPublisher,
    {
        self.detach(host);

        let core = self.core.clone();
        let id = host.subscribe_to_source_changes(
            &self.core.pv_entity_id,
            Box::new(
                move |source: Option<&SourceState>, publisher: &mut dyn EntityPublisher| {
                    // Outcome is already published; nothing propagates to the host.
                    let _ = core.update(source, publisher);
                },
            ),
        );
        self.subscription = Some(id);
        info!(
            pv_entity_id = %self.core.pv_entity_id,
            consumption_kwh_per_100km = self.core.engine.rate().kwh_per_100km(),
            locale = %self.core.engine.locale(),
            "solar range sensor attached"
        );

        let current = host.source_state(&self.core.pv_entity_id);
        self.core.update(current.as_ref(), host)
    }

    /// Drops the source subscription, if any.
    pub fn detach<H: SourceEvents + ?Sized>(&mut self, host: &mut H) {
        if let Some(id) = self.subscription.take() {
            host.unsubscribe(id);
            info!(pv_entity_id = %self.core.pv_entity_id, "solar range sensor detached");
        }
    }

    /// Recomputes from an explicit source state and publishes the outcome.
    pub fn refresh(
        &self,
        source: Option<&SourceState>,
        publisher: &mut dyn EntityPublisher,
    ) -> Result<ComputationResult, EngineError> {
        self.core.update(source, publisher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHost;

    const PV: &str = "sensor.pv_power";

    fn sensor() -> SolarRangeSensor {
        SolarRangeSensor::new(PV, 18.0, Locale::En).expect("valid sensor")
    }

    #[test]
    fn rejects_zero_consumption() {
        let err = SolarRangeSensor::new(PV, 0.0, Locale::En).expect_err("should reject");
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_empty_entity_id() {
        assert!(SolarRangeSensor::new("  ", 18.0, Locale::En).is_err());
    }

    #[test]
    fn attach_without_source_publishes_unavailable() {
        let mut host = InMemoryHost::new();
        let mut sensor = sensor();
        let outcome = sensor.attach(&mut host);
        assert!(matches!(outcome, Err(EngineError::SourceUnavailable(_))));
        assert!(sensor.is_attached());

        let range = host.get("sensor.solar_range_km").expect("range entity");
        assert_eq!(range.state, EntityState::Unavailable);
        assert_eq!(range.attributes["pv_entity_id"], json!(PV));
        assert!(!range.attributes.contains_key("message"));
    }

    #[test]
    fn refresh_publishes_every_metric() {
        let mut host = InMemoryHost::new();
        let source = SourceState::new("5", Some("kW"));
        sensor()
            .refresh(Some(&source), &mut host)
            .expect("valid reading");
        for id in sensor().entity_ids() {
            let record = host.get(&id).expect("metric entity");
            assert!(record.state.is_available(), "{id}");
            assert!(record.unit_of_measurement.is_some(), "{id}");
        }
        let range = host.get("sensor.solar_range_km").expect("range entity");
        assert_eq!(range.state, EntityState::Value(27.78));
        assert!(range.attributes.contains_key("calculated_at"));
    }

    #[test]
    fn detach_removes_subscription() {
        let mut host = InMemoryHost::new();
        let mut sensor = sensor();
        let _ = sensor.attach(&mut host);
        assert_eq!(host.subscription_count(), 1);
        let _ = sensor.attach(&mut host);
        assert_eq!(host.subscription_count(), 1);
        sensor.detach(&mut host);
        assert_eq!(host.subscription_count(), 0);
        assert!(!sensor.is_attached());
    }
}
