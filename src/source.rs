//! Normalizes a raw source entity state into a [`MeasurementInput`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::{MeasurementInput, PvSource};
use crate::error::EngineError;

/// Hours of production assumed when the source reports power.
pub const POWER_ASSUMED_HOURS: f64 = 1.0;

/// Units accepted from the source entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceUnit {
    #[serde(rename = "kW")]
    Kilowatt,
    #[serde(rename = "kWh")]
    KilowattHour,
}

impl SourceUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kilowatt => "kW",
            Self::KilowattHour => "kWh",
        }
    }

    fn source_kind(self) -> PvSource {
        match self {
            Self::Kilowatt => PvSource::Power,
            Self::KilowattHour => PvSource::Energy,
        }
    }
}

impl FromStr for SourceUnit {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kW" => Ok(Self::Kilowatt),
            "kWh" => Ok(Self::KilowattHour),
            other => Err(EngineError::SourceUnavailable(format!(
                "unsupported unit \"{other}\", expected kW or kWh"
            ))),
        }
    }
}

impl fmt::Display for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw state of the configured source entity as the host reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceState {
    /// State string, e.g. `"4.2"`, `"unknown"` or `"unavailable"`.
    pub state: String,
    /// `unit_of_measurement` attribute, if present.
    pub unit: Option<String>,
}

impl SourceState {
    pub fn new(state: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            state: state.into(),
            unit: unit.map(str::to_string),
        }
    }

    /// A numeric reading in the given unit.
    pub fn reading(value: f64, unit: SourceUnit) -> Self {
        Self::new(value.to_string(), Some(unit.as_str()))
    }
}

/// Reads the source state of `entity_id` and converts it to energy.
///
/// # Errors
///
/// Returns [`EngineError::SourceUnavailable`] when the state is missing,
/// `unknown`/`unavailable`, non-numeric, negative, or reported in a unit
/// other than `kW`/`kWh`.
pub fn read_source(
    entity_id: &str,
    state: Option<&SourceState>,
) -> Result<MeasurementInput, EngineError> {
    let state = state.ok_or_else(|| {
        EngineError::SourceUnavailable(format!("entity {entity_id} does not exist"))
    })?;

    let raw = state.state.trim();
    if raw.is_empty() || raw == "unknown" || raw == "unavailable" {
        return Err(EngineError::SourceUnavailable(format!(
            "entity {entity_id} is {}",
            if raw.is_empty() { "empty" } else { raw }
        )));
    }

    let value: f64 = raw.parse().map_err(|_| {
        EngineError::SourceUnavailable(format!(
            "entity {entity_id} has non-numeric state \"{raw}\""
        ))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::SourceUnavailable(format!(
            "entity {entity_id} reported {value}, expected a finite value >= 0"
        )));
    }

    let unit: SourceUnit = state
        .unit
        .as_deref()
        .ok_or_else(|| {
            EngineError::SourceUnavailable(format!("entity {entity_id} has no unit"))
        })?
        .parse()?;

    let energy_kwh = match unit {
        SourceUnit::Kilowatt => value * POWER_ASSUMED_HOURS,
        SourceUnit::KilowattHour => value,
    };

    Ok(MeasurementInput {
        energy_kwh,
        entity_id: Some(entity_id.to_string()),
        source: unit.source_kind(),
    })
}
