use crate::devices::types::{Device, DeviceContext, daylight_frac, gaussian_noise};
use crate::source::{SourceState, SourceUnit};
use rand::{SeedableRng, rngs::StdRng};

/// A solar PV generator used as the demo source entity.
///
/// `SolarPv` creates a half-sine generation profile between sunrise and
/// sunset with configurable peak output and multiplicative Gaussian noise
/// standing in for passing clouds.
#[derive(Debug, Clone)]
pub struct SolarPv {
    /// Maximum power output in kilowatts under ideal conditions.
    pub kw_peak: f64,

    /// Number of time steps per simulated day.
    steps_per_day: usize,

    /// Time step index when sunrise occurs (inclusive).
    pub sunrise_idx: usize,

    /// Time step index when sunset occurs (exclusive).
    pub sunset_idx: usize,

    /// Standard deviation of the Gaussian noise as a fraction of output.
    pub noise_std: f64,

    /// Random number generator for noise generation.
    rng: StdRng,
}

impl SolarPv {
    /// Creates a new solar PV generator with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `kw_peak` - Maximum power output in kilowatts under ideal conditions
    /// * `steps_per_day` - Ticks per simulated day
    /// * `sunrise_idx` - Time step index when sunrise occurs (inclusive)
    /// * `sunset_idx` - Time step index when sunset occurs (exclusive)
    /// * `noise_std` - Standard deviation of noise (e.g., 0.05 for +/-5% variation)
    /// * `seed` - Random seed for reproducible noise generation
    ///
    /// # Panics
    ///
    /// Panics if `sunrise_idx >= sunset_idx` or `sunset_idx > steps_per_day`.
    pub fn new(
        kw_peak: f64,
        steps_per_day: usize,
        sunrise_idx: usize,
        sunset_idx: usize,
        noise_std: f64,
        seed: u64,
    ) -> Self {
        assert!(sunrise_idx < sunset_idx && sunset_idx <= steps_per_day);
        Self {
            kw_peak: kw_peak.max(0.0),
            steps_per_day,
            sunrise_idx,
            sunset_idx,
            noise_std: noise_std.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Duration of one tick in hours.
    pub fn dt_hours(&self) -> f64 {
        24.0 / self.steps_per_day as f64
    }

    pub fn steps_per_day(&self) -> usize {
        self.steps_per_day
    }

    /// Produces the source entity state for a tick in the requested unit.
    ///
    /// `kWh` readings are the energy generated during the tick.
    pub fn reading(&mut self, context: &DeviceContext, unit: SourceUnit) -> SourceState {
        let kw = self.power_kw(context);
        let value = match unit {
            SourceUnit::Kilowatt => kw,
            SourceUnit::KilowattHour => kw * self.dt_hours(),
        };
        SourceState::reading((value * 1000.0).round() / 1000.0, unit)
    }
}

impl Device for SolarPv {
    /// Generated power at a tick; 0.0 at night.
    fn power_kw(&mut self, context: &DeviceContext) -> f64 {
        let frac = daylight_frac(
            context.timestep,
            self.steps_per_day,
            self.sunrise_idx,
            self.sunset_idx,
        );
        if frac <= 0.0 {
            return 0.0;
        }

        let noise_mult = 1.0 + gaussian_noise(&mut self.rng, self.noise_std);
        (self.kw_peak * frac * noise_mult).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(t: usize) -> DeviceContext {
        DeviceContext::new(t)
    }

    #[test]
    fn test_new_solar_pv() {
        let pv = SolarPv::new(5.0, 24, 6, 18, 0.05, 42);
        assert_eq!(pv.kw_peak, 5.0);
        assert_eq!(pv.steps_per_day, 24);
        assert_eq!(pv.sunrise_idx, 6);
        assert_eq!(pv.sunset_idx, 18);
        assert_eq!(pv.noise_std, 0.05);
        assert_eq!(pv.dt_hours(), 1.0);
    }

    #[test]
    fn test_negative_kw_peak_clamped_to_zero() {
        let pv = SolarPv::new(-1.0, 24, 6, 18, 0.05, 42);
        assert_eq!(pv.kw_peak, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_sunset_before_sunrise_panics() {
        SolarPv::new(5.0, 24, 18, 6, 0.05, 42);
    }

    #[test]
    #[should_panic]
    fn test_sunset_exceeds_steps_panics() {
        SolarPv::new(5.0, 24, 6, 25, 0.05, 42);
    }

    #[test]
    fn test_no_generation_at_night() {
        let mut pv = SolarPv::new(5.0, 24, 6, 18, 0.0, 42);
        assert_eq!(pv.power_kw(&ctx(0)), 0.0);
        assert_eq!(pv.power_kw(&ctx(5)), 0.0);
        assert_eq!(pv.power_kw(&ctx(18)), 0.0);
        assert_eq!(pv.power_kw(&ctx(23)), 0.0);
    }

    #[test]
    fn test_peak_generation_at_noon() {
        let mut pv = SolarPv::new(5.0, 24, 6, 18, 0.0, 42);
        let noon = pv.power_kw(&ctx(12));
        assert!(noon > 4.9 && noon <= 5.0);
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let mut pv1 = SolarPv::new(5.0, 24, 6, 18, 0.1, 42);
        let mut pv2 = SolarPv::new(5.0, 24, 6, 18, 0.1, 42);
        for t in 0..24 {
            assert_eq!(pv1.power_kw(&ctx(t)), pv2.power_kw(&ctx(t)));
        }
    }

    #[test]
    fn test_solar_never_negative() {
        let mut pv = SolarPv::new(5.0, 24, 6, 18, 0.5, 42);
        for t in 0..48 {
            assert!(pv.power_kw(&ctx(t)) >= 0.0);
        }
    }

    #[test]
    fn test_energy_reading_scales_with_tick_length() {
        let mut pv = SolarPv::new(4.0, 48, 12, 36, 0.0, 1);
        let reading = pv.reading(&ctx(24), SourceUnit::KilowattHour);
        assert_eq!(reading.unit.as_deref(), Some("kWh"));
        assert_eq!(reading.state, "2");
    }
}
