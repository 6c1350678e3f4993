//! Derived-metrics engine: energy in, range and fun-fact equivalents out.

pub mod compute;
/// Message templates per language.
pub mod locale;
/// Static metric definitions.
pub mod registry;

pub use compute::{
    ComputationResult, ConsumptionRate, DerivedMetricsEngine, MeasurementInput, PvSource, compute,
};
pub use locale::Locale;
pub use registry::{DerivedMetric, RANGE_KEY, REGISTRY};
