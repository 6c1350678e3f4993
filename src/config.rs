//! TOML-based integration configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::card::CardConfig;
use crate::devices::SolarPv;
use crate::engine::Locale;
use crate::error::EngineError;
use crate::sensor::SolarRangeSensor;
use crate::source::SourceUnit;

/// Consumption used when none is configured (kWh/100 km).
pub const DEFAULT_CONSUMPTION: f64 = 18.0;
/// Lowest consumption accepted by the setup form.
pub const MIN_CONSUMPTION: f64 = 1.0;
/// Highest consumption accepted by the setup form.
pub const MAX_CONSUMPTION: f64 = 100.0;

/// Top-level configuration parsed from TOML.
///
/// All sections have defaults matching the `default` preset. Load from
/// TOML with [`AppConfig::from_toml_file`] or use [`AppConfig::baseline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Source entity, consumption and language.
    #[serde(default)]
    pub integration: IntegrationConfig,
    /// Later overrides of the integration settings.
    #[serde(default)]
    pub options: OptionsConfig,
    /// Dashboard card.
    #[serde(default)]
    pub card: CardConfig,
    /// Demo PV source parameters.
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Settings captured when the integration is first set up.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegrationConfig {
    /// Source sensor entity id (`sensor.*`), reporting kW or kWh.
    pub pv_entity_id: String,
    /// Vehicle consumption (kWh/100 km).
    pub consumption_kwh_per_100km: f64,
    /// Message language tag, e.g. `de` or `fr-CH`.
    pub language: String,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            pv_entity_id: "sensor.pv_power".to_string(),
            consumption_kwh_per_100km: DEFAULT_CONSUMPTION,
            language: "en".to_string(),
        }
    }
}

/// Options that take precedence over [`IntegrationConfig`] when set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsConfig {
    pub pv_entity_id: Option<String>,
    pub consumption_kwh_per_100km: Option<f64>,
}

/// Demo PV source parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Ticks per simulated day (must be > 0).
    pub steps_per_day: usize,
    /// Number of days to replay (must be > 0).
    pub days: usize,
    /// Peak generation (kW).
    pub kw_peak: f64,
    /// Sunrise tick index (inclusive).
    pub sunrise_idx: usize,
    /// Sunset tick index (exclusive).
    pub sunset_idx: usize,
    /// Multiplicative noise standard deviation.
    pub noise_std: f64,
    /// Random seed.
    pub seed: u64,
    /// Unit the demo source reports in.
    pub unit: SourceUnit,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            steps_per_day: 24,
            days: 1,
            kw_peak: 5.0,
            sunrise_idx: 6,
            sunset_idx: 18,
            noise_std: 0.05,
            seed: 42,
            unit: SourceUnit::Kilowatt,
        }
    }
}

impl DemoConfig {
    /// Total ticks across all days.
    pub fn total_steps(&self) -> usize {
        self.steps_per_day * self.days
    }
}

/// Effective settings after merging options over the initial setup.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationSettings {
    pub pv_entity_id: String,
    pub consumption_kwh_per_100km: f64,
    pub locale: Locale,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"integration.consumption_kwh_per_100km"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl AppConfig {
    /// Returns the default configuration.
    pub fn baseline() -> Self {
        Self {
            integration: IntegrationConfig::default(),
            options: OptionsConfig::default(),
            card: CardConfig::default(),
            demo: DemoConfig::default(),
        }
    }

    /// Compact EV with a low consumption and an energy-reporting source.
    pub fn efficient() -> Self {
        Self {
            integration: IntegrationConfig {
                pv_entity_id: "sensor.pv_energy_hourly".to_string(),
                consumption_kwh_per_100km: 14.0,
                ..IntegrationConfig::default()
            },
            demo: DemoConfig {
                unit: SourceUnit::KilowattHour,
                ..DemoConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Large SUV on a big rooftop array.
    pub fn suv() -> Self {
        Self {
            integration: IntegrationConfig {
                consumption_kwh_per_100km: 24.0,
                ..IntegrationConfig::default()
            },
            demo: DemoConfig {
                kw_peak: 12.0,
                sunrise_idx: 5,
                sunset_idx: 19,
                noise_std: 0.1,
                ..DemoConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "efficient", "suv"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::baseline()),
            "efficient" => Ok(Self::efficient()),
            "suv" => Ok(Self::suv()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Integration settings with options applied on top.
    pub fn settings(&self) -> IntegrationSettings {
        IntegrationSettings {
            pv_entity_id: self
                .options
                .pv_entity_id
                .clone()
                .unwrap_or_else(|| self.integration.pv_entity_id.clone()),
            consumption_kwh_per_100km: self
                .options
                .consumption_kwh_per_100km
                .unwrap_or(self.integration.consumption_kwh_per_100km),
            locale: Locale::from_tag(&self.integration.language),
        }
    }

    /// Builds a detached sensor from the effective settings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] for an unusable consumption
    /// or entity id.
    pub fn build_sensor(&self) -> Result<SolarRangeSensor, EngineError> {
        let s = self.settings();
        SolarRangeSensor::new(s.pv_entity_id, s.consumption_kwh_per_100km, s.locale)
    }

    /// Builds the demo PV source. Call only on a validated configuration.
    pub fn build_source(&self) -> SolarPv {
        let d = &self.demo;
        SolarPv::new(
            d.kw_peak,
            d.steps_per_day,
            d.sunrise_idx,
            d.sunset_idx,
            d.noise_std,
            d.seed,
        )
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = self.settings();

        if !s.pv_entity_id.starts_with("sensor.") || s.pv_entity_id.len() <= "sensor.".len() {
            errors.push(ConfigError {
                field: "integration.pv_entity_id".into(),
                message: format!("must be a sensor entity id, got \"{}\"", s.pv_entity_id),
            });
        }

        let c = s.consumption_kwh_per_100km;
        if !(MIN_CONSUMPTION..=MAX_CONSUMPTION).contains(&c) {
            let field = if self.options.consumption_kwh_per_100km.is_some() {
                "options.consumption_kwh_per_100km"
            } else {
                "integration.consumption_kwh_per_100km"
            };
            errors.push(ConfigError {
                field: field.into(),
                message: format!("must be in [{MIN_CONSUMPTION}, {MAX_CONSUMPTION}], got {c}"),
            });
        }

        if let Err(e) = self.card.validate() {
            errors.push(ConfigError {
                field: "card.entities".into(),
                message: e.to_string(),
            });
        }

        let d = &self.demo;
        if d.steps_per_day == 0 {
            errors.push(ConfigError {
                field: "demo.steps_per_day".into(),
                message: "must be > 0".into(),
            });
        }
        if d.days == 0 {
            errors.push(ConfigError {
                field: "demo.days".into(),
                message: "must be > 0".into(),
            });
        }
        if d.sunrise_idx >= d.sunset_idx {
            errors.push(ConfigError {
                field: "demo.sunrise_idx".into(),
                message: "must be < demo.sunset_idx".into(),
            });
        }
        if d.steps_per_day > 0 && d.sunset_idx > d.steps_per_day {
            errors.push(ConfigError {
                field: "demo.sunset_idx".into(),
                message: "must be <= demo.steps_per_day".into(),
            });
        }
        if d.kw_peak < 0.0 || !d.kw_peak.is_finite() {
            errors.push(ConfigError {
                field: "demo.kw_peak".into(),
                message: "must be a finite value >= 0".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = AppConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in AppConfig::PRESETS {
            let cfg = AppConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = AppConfig::from_preset("tractor").expect_err("unknown preset");
        assert!(err.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[integration]
pv_entity_id = "sensor.inverter_energy"
consumption_kwh_per_100km = 16.5
language = "de-CH"

[card]
title = "PV"
show_controls = false

[[card.entities]]
entity = "sensor.solar_range_km"
name = "Range"
secondary_attribute = "message"

[[card.entities]]
entity = "sensor.solar_coffee_cups"
icon = "mdi:coffee-outline"

[demo]
steps_per_day = 48
sunrise_idx = 12
sunset_idx = 36
unit = "kWh"
"#;
        let cfg = AppConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        let settings = cfg.as_ref().map(AppConfig::settings);
        assert_eq!(settings.as_ref().map(|s| s.locale), Some(Locale::De));
        assert_eq!(
            settings.as_ref().map(|s| s.consumption_kwh_per_100km),
            Some(16.5)
        );
        assert_eq!(cfg.as_ref().map(|c| c.card.entities.len()), Some(2));
        assert_eq!(cfg.as_ref().map(|c| c.card.show_controls), Some(false));
        assert_eq!(cfg.as_ref().map(|c| c.demo.unit), Some(SourceUnit::KilowattHour));
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[integration]
pv_entity_id = "sensor.pv"
bogus_field = true
"#;
        assert!(AppConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn options_override_integration() {
        let toml = r#"
[integration]
pv_entity_id = "sensor.pv_power"
consumption_kwh_per_100km = 18.0

[options]
consumption_kwh_per_100km = 21.0
"#;
        let cfg = AppConfig::from_toml_str(toml).ok();
        let settings = cfg.as_ref().map(AppConfig::settings);
        assert_eq!(
            settings.as_ref().map(|s| s.consumption_kwh_per_100km),
            Some(21.0)
        );
        assert_eq!(
            settings.as_ref().map(|s| s.pv_entity_id.as_str()),
            Some("sensor.pv_power")
        );
    }

    #[test]
    fn validation_catches_zero_consumption() {
        let mut cfg = AppConfig::baseline();
        cfg.integration.consumption_kwh_per_100km = 0.0;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "integration.consumption_kwh_per_100km")
        );
        assert!(cfg.build_sensor().is_err());
    }

    #[test]
    fn validation_blames_options_when_they_override() {
        let mut cfg = AppConfig::baseline();
        cfg.options.consumption_kwh_per_100km = Some(250.0);
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "options.consumption_kwh_per_100km")
        );
    }

    #[test]
    fn validation_catches_non_sensor_entity() {
        let mut cfg = AppConfig::baseline();
        cfg.integration.pv_entity_id = "switch.pv".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "integration.pv_entity_id"));
    }

    #[test]
    fn validation_catches_empty_card() {
        let mut cfg = AppConfig::baseline();
        cfg.card.entities.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "card.entities"));
    }

    #[test]
    fn validation_catches_bad_daylight_window() {
        let mut cfg = AppConfig::baseline();
        cfg.demo.sunrise_idx = 20;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "demo.sunrise_idx"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[integration]
language = "es"
"#;
        let cfg = AppConfig::from_toml_str(toml).ok();
        assert_eq!(
            cfg.as_ref().map(|c| c.integration.consumption_kwh_per_100km),
            Some(DEFAULT_CONSUMPTION)
        );
        assert_eq!(cfg.as_ref().map(|c| c.demo.steps_per_day), Some(24));
        assert_eq!(
            cfg.as_ref().map(|c| c.card.entities.len()),
            Some(crate::engine::REGISTRY.len())
        );
    }
}
