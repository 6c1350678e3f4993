//! Demo replay: drives the in-memory host with a simulated PV day.
//!
//! Each tick writes one source reading; the attached sensor recomputes
//! inside the host's change callback and the tick record is read back
//! from the published entities.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::devices::{DeviceContext, SolarPv};
use crate::engine::{RANGE_KEY, REGISTRY};
use crate::error::EngineError;
use crate::host::InMemoryHost;
use crate::sensor::SolarRangeSensor;
use crate::source::{SourceState, SourceUnit};

/// What the host showed after one source update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayTick {
    /// Tick index.
    pub timestep: usize,
    /// Simulated time in hours.
    pub time_hr: f64,
    /// Raw source reading written to the host.
    pub source: SourceState,
    /// Whether the sensor entities were available after the update.
    pub available: bool,
    /// Published value per metric key (`None` when unavailable).
    pub values: BTreeMap<String, Option<f64>>,
    /// Message attribute of the range entity.
    pub message: Option<String>,
}

impl ReplayTick {
    pub fn range_km(&self) -> Option<f64> {
        self.values.get(RANGE_KEY).copied().flatten()
    }
}

impl fmt::Display for ReplayTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.source.unit.as_deref().unwrap_or("?");
        write!(
            f,
            "t={:>3} ({:>5.1}h) | pv={:>7} {:<3} | ",
            self.timestep, self.time_hr, self.source.state, unit
        )?;
        match self.range_km() {
            Some(km) => write!(
                f,
                "range={km:>7.2} km  coffee={:>5}  earth={:.5}",
                self.values
                    .get("coffee_cups")
                    .copied()
                    .flatten()
                    .unwrap_or_default(),
                self.values
                    .get("trips_around_earth")
                    .copied()
                    .flatten()
                    .unwrap_or_default(),
            ),
            None => write!(f, "unavailable"),
        }
    }
}

/// Owns the host, the attached sensor and the demo source.
pub struct Replay {
    host: InMemoryHost,
    sensor: SolarRangeSensor,
    source: SolarPv,
    unit: SourceUnit,
    total_steps: usize,
}

impl Replay {
    /// Builds and attaches everything from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if the sensor settings
    /// are unusable.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, EngineError> {
        let mut host = InMemoryHost::new();
        let mut sensor = cfg.build_sensor()?;
        // No reading yet, so the initial publish is expected to be unavailable.
        let _ = sensor.attach(&mut host);
        info!(
            steps = cfg.demo.total_steps(),
            unit = %cfg.demo.unit,
            "demo replay ready"
        );
        Ok(Self {
            host,
            sensor,
            source: cfg.build_source(),
            unit: cfg.demo.unit,
            total_steps: cfg.demo.total_steps(),
        })
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn host(&self) -> &InMemoryHost {
        &self.host
    }

    pub fn sensor(&self) -> &SolarRangeSensor {
        &self.sensor
    }

    /// Writes the reading for tick `t` and returns what the host now shows.
    pub fn step(&mut self, t: usize) -> ReplayTick {
        let reading = self.source.reading(&DeviceContext::new(t), self.unit);
        self.host
            .set_source(self.sensor.pv_entity_id(), reading.clone());
        self.snapshot(t, reading)
    }

    /// Writes an arbitrary source state (e.g. `unavailable`) for tick `t`.
    pub fn inject(&mut self, t: usize, reading: SourceState) -> ReplayTick {
        self.host
            .set_source(self.sensor.pv_entity_id(), reading.clone());
        self.snapshot(t, reading)
    }

    /// Executes all ticks in order.
    pub fn run(&mut self) -> Vec<ReplayTick> {
        (0..self.total_steps).map(|t| self.step(t)).collect()
    }

    fn snapshot(&self, t: usize, source: SourceState) -> ReplayTick {
        let values: BTreeMap<String, Option<f64>> = REGISTRY
            .iter()
            .map(|metric| {
                let value = self
                    .host
                    .get(&metric.entity_id())
                    .and_then(|r| r.state.as_f64());
                (metric.key.to_string(), value)
            })
            .collect();
        let range = self.host.get(&REGISTRY[0].entity_id());
        let available = range.is_some_and(|r| r.state.is_available());
        let message = range
            .and_then(|r| r.attributes.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string);

        ReplayTick {
            timestep: t,
            time_hr: t as f64 * self.source.dt_hours(),
            source,
            available,
            values,
            message,
        }
    }
}
