//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use solar_range::card::{Card, CardConfig, CardEntityConfig};
use solar_range::engine::Locale;
use solar_range::host::InMemoryHost;
use solar_range::sensor::SolarRangeSensor;
use solar_range::source::{SourceState, SourceUnit};

/// Source entity used across integration tests.
pub const PV_ENTITY: &str = "sensor.pv_power";

/// Default sensor (18 kWh/100 km, English).
pub fn default_sensor() -> SolarRangeSensor {
    SolarRangeSensor::new(PV_ENTITY, 18.0, Locale::En).expect("valid sensor")
}

/// Fresh host with the default sensor attached and no source reading yet.
pub fn attached_host() -> (InMemoryHost, SolarRangeSensor) {
    let mut host = InMemoryHost::new();
    let mut sensor = default_sensor();
    let _ = sensor.attach(&mut host);
    (host, sensor)
}

/// Power reading in kW.
pub fn kw(value: f64) -> SourceState {
    SourceState::reading(value, SourceUnit::Kilowatt)
}

/// Energy reading in kWh.
pub fn kwh(value: f64) -> SourceState {
    SourceState::reading(value, SourceUnit::KilowattHour)
}

/// Card over range, coffee and smartphone entities.
pub fn three_slide_card() -> Card {
    Card::new(CardConfig {
        title: "Solar".to_string(),
        show_controls: true,
        entities: vec![
            CardEntityConfig::new("sensor.solar_range_km"),
            CardEntityConfig::new("sensor.solar_coffee_cups"),
            CardEntityConfig::new("sensor.solar_smartphone_charges"),
        ],
    })
}

/// Reads a published numeric state.
pub fn value_of(host: &InMemoryHost, entity_id: &str) -> Option<f64> {
    host.get(entity_id).and_then(|r| r.state.as_f64())
}
