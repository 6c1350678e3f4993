//! Static registry of derived metrics.
//!
//! Every entry is a pure conversion of the driving range and/or the
//! available energy into a more relatable quantity. The registry is a
//! `const` slice: built at compile time, ordered, never mutated.

/// Earth's equatorial circumference (km).
pub const EARTH_CIRCUMFERENCE_KM: f64 = 40_075.0;
/// Official marathon distance (km).
pub const MARATHON_KM: f64 = 42.195;
/// Road distance Berlin to Munich (km).
pub const BERLIN_MUNICH_KM: f64 = 585.0;
/// Energy to brew one cup of coffee (kWh).
pub const COFFEE_CUP_KWH: f64 = 0.1;
/// Energy for one full smartphone charge (kWh).
pub const SMARTPHONE_CHARGE_KWH: f64 = 0.015;
/// Energy for one washing machine cycle at 40 °C (kWh).
pub const WASHING_CYCLE_KWH: f64 = 0.9;
/// Laptop draw (kW).
pub const LAPTOP_KW: f64 = 0.05;
/// LED bulb draw (kW).
pub const LED_BULB_KW: f64 = 0.009;
/// Television draw (kW).
pub const TV_KW: f64 = 0.1;

/// Key of the primary metric that carries the message and source attributes.
pub const RANGE_KEY: &str = "range_km";

/// One derived metric definition.
#[derive(Debug, Clone, Copy)]
pub struct DerivedMetric {
    /// Unique key, also the entity suffix (`sensor.solar_<key>`).
    pub key: &'static str,
    /// Human-readable name used as the entity friendly name.
    pub name: &'static str,
    /// Unit of measurement.
    pub unit: &'static str,
    /// Material Design icon.
    pub icon: &'static str,
    /// Decimal places kept after round-half-up.
    pub precision: u32,
    /// Pure conversion from `(range_km, energy_kwh)`.
    pub convert: fn(f64, f64) -> f64,
}

impl DerivedMetric {
    /// Applies the conversion and rounds to this metric's precision.
    pub fn evaluate(&self, range_km: f64, energy_kwh: f64) -> f64 {
        round_half_up((self.convert)(range_km, energy_kwh), self.precision)
    }

    /// Entity id under which this metric is published.
    pub fn entity_id(&self) -> String {
        format!("sensor.solar_{}", self.key)
    }
}

/// Rounds half away from zero at `precision` decimal places.
///
/// Inputs are non-negative, so this is round-half-up.
pub fn round_half_up(value: f64, precision: u32) -> f64 {
    let scale = 10_f64.powi(precision as i32);
    (value * scale).round() / scale
}

/// All derived metrics, in publication order.
pub static REGISTRY: &[DerivedMetric] = &[
    DerivedMetric {
        key: RANGE_KEY,
        name: "Solar driving range",
        unit: "km",
        icon: "mdi:car-electric",
        precision: 2,
        convert: |range_km, _| range_km,
    },
    DerivedMetric {
        key: "trips_around_earth",
        name: "Trips around the Earth",
        unit: "trips",
        icon: "mdi:earth",
        precision: 5,
        convert: |range_km, _| range_km / EARTH_CIRCUMFERENCE_KM,
    },
    DerivedMetric {
        key: "marathons",
        name: "Marathon distances",
        unit: "marathons",
        icon: "mdi:run",
        precision: 1,
        convert: |range_km, _| range_km / MARATHON_KM,
    },
    DerivedMetric {
        key: "berlin_munich_trips",
        name: "Berlin to Munich trips",
        unit: "trips",
        icon: "mdi:highway",
        precision: 2,
        convert: |range_km, _| range_km / BERLIN_MUNICH_KM,
    },
    DerivedMetric {
        key: "coffee_cups",
        name: "Cups of coffee",
        unit: "cups",
        icon: "mdi:coffee",
        precision: 0,
        convert: |_, energy_kwh| energy_kwh / COFFEE_CUP_KWH,
    },
    DerivedMetric {
        key: "smartphone_charges",
        name: "Smartphone charges",
        unit: "charges",
        icon: "mdi:cellphone-charging",
        precision: 0,
        convert: |_, energy_kwh| energy_kwh / SMARTPHONE_CHARGE_KWH,
    },
    DerivedMetric {
        key: "washing_machine_cycles",
        name: "Washing machine cycles",
        unit: "cycles",
        icon: "mdi:washing-machine",
        precision: 1,
        convert: |_, energy_kwh| energy_kwh / WASHING_CYCLE_KWH,
    },
    DerivedMetric {
        key: "laptop_hours",
        name: "Laptop hours",
        unit: "h",
        icon: "mdi:laptop",
        precision: 1,
        convert: |_, energy_kwh| energy_kwh / LAPTOP_KW,
    },
    DerivedMetric {
        key: "led_bulb_hours",
        name: "LED bulb hours",
        unit: "h",
        icon: "mdi:lightbulb-on",
        precision: 0,
        convert: |_, energy_kwh| energy_kwh / LED_BULB_KW,
    },
    DerivedMetric {
        key: "tv_hours",
        name: "TV hours",
        unit: "h",
        icon: "mdi:television",
        precision: 1,
        convert: |_, energy_kwh| energy_kwh / TV_KW,
    },
];

/// Looks up a metric by key.
pub fn find(key: &str) -> Option<&'static DerivedMetric> {
    REGISTRY.iter().find(|m| m.key == key)
}
