//! Range computation and fan-out over the metric registry.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

use super::locale::Locale;
use super::registry::{REGISTRY, RANGE_KEY};
use crate::error::EngineError;

/// User-configured vehicle consumption in kWh per 100 km.
///
/// Always finite and strictly positive once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsumptionRate(f64);

impl ConsumptionRate {
    /// Validates and wraps a consumption value.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] for zero, negative or
    /// non-finite values.
    pub fn new(kwh_per_100km: f64) -> Result<Self, EngineError> {
        if !kwh_per_100km.is_finite() || kwh_per_100km <= 0.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "consumption_kwh_per_100km must be > 0, got {kwh_per_100km}"
            )));
        }
        Ok(Self(kwh_per_100km))
    }

    pub fn kwh_per_100km(self) -> f64 {
        self.0
    }
}

/// Kind of reading the energy value was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PvSource {
    /// Instantaneous power (kW), converted under a one-hour assumption.
    Power,
    /// Energy reading (kWh), used as-is.
    Energy,
}

impl PvSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Energy => "energy",
        }
    }
}

impl fmt::Display for PvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized energy available for the period.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementInput {
    /// Energy in kWh, already unit-converted.
    pub energy_kwh: f64,
    /// Entity the reading came from, if any.
    pub entity_id: Option<String>,
    /// Whether the reading was power or energy.
    pub source: PvSource,
}

impl MeasurementInput {
    /// A bare energy value with no originating entity.
    pub fn energy(energy_kwh: f64) -> Self {
        Self {
            energy_kwh,
            entity_id: None,
            source: PvSource::Energy,
        }
    }
}

/// Output of one computation tick.
///
/// A pure projection of the inputs: no identity, never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputationResult {
    /// Rounded value per registry key, in key order.
    pub values: BTreeMap<String, f64>,
    /// Localized human-readable summary.
    pub message: String,
    /// Attributes attached to the primary range entity.
    pub attributes: BTreeMap<String, Value>,
}

impl ComputationResult {
    /// Rounded driving range in km.
    pub fn range_km(&self) -> f64 {
        self.values.get(RANGE_KEY).copied().unwrap_or_default()
    }

    /// Rounded value for a registry key.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// Converts energy into range and derived equivalents for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetricsEngine {
    rate: ConsumptionRate,
    locale: Locale,
}

impl DerivedMetricsEngine {
    /// Creates an engine, validating the consumption at setup time.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if the consumption is not
    /// strictly positive.
    pub fn new(consumption_kwh_per_100km: f64, locale: Locale) -> Result<Self, EngineError> {
        Ok(Self {
            rate: ConsumptionRate::new(consumption_kwh_per_100km)?,
            locale,
        })
    }

    pub fn rate(&self) -> ConsumptionRate {
        self.rate
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Computes range, every derived metric, the message and the attributes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SourceUnavailable`] when the energy is negative
    /// or not finite.
    pub fn compute(&self, input: &MeasurementInput) -> Result<ComputationResult, EngineError> {
        let energy_kwh = input.energy_kwh;
        if !energy_kwh.is_finite() || energy_kwh < 0.0 {
            return Err(EngineError::SourceUnavailable(format!(
                "energy must be a finite value >= 0, got {energy_kwh}"
            )));
        }

        let consumption = self.rate.kwh_per_100km();
        let range_km = energy_kwh / consumption * 100.0;
        if !range_km.is_finite() {
            return Err(EngineError::SourceUnavailable(format!(
                "range overflowed for {energy_kwh} kWh at {consumption} kWh/100 km"
            )));
        }

        let values: BTreeMap<String, f64> = REGISTRY
            .iter()
            .map(|metric| (metric.key.to_string(), metric.evaluate(range_km, energy_kwh)))
            .collect();

        let message = self.locale.message(range_km, consumption);

        let mut attributes = BTreeMap::new();
        attributes.insert("message".to_string(), json!(message));
        attributes.insert("consumption_kwh_per_100km".to_string(), json!(consumption));
        attributes.insert(
            "pv_entity_id".to_string(),
            input.entity_id.as_deref().map_or(Value::Null, |id| json!(id)),
        );
        attributes.insert("pv_energy_kwh".to_string(), json!(energy_kwh));
        attributes.insert("pv_source".to_string(), json!(input.source.as_str()));

        Ok(ComputationResult {
            values,
            message,
            attributes,
        })
    }
}

/// One-shot computation with English messages.
///
/// # Errors
///
/// `InvalidConfiguration` for a non-positive consumption, otherwise
/// `SourceUnavailable` for a negative or non-finite energy.
pub fn compute(
    energy_kwh: f64,
    consumption_kwh_per_100km: f64,
) -> Result<ComputationResult, EngineError> {
    DerivedMetricsEngine::new(consumption_kwh_per_100km, Locale::En)?
        .compute(&MeasurementInput::energy(energy_kwh))
}
