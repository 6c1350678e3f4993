//! Common types and traits for the demo source devices.

use rand::{Rng, rngs::StdRng};

/// Contextual information passed to devices for one tick.
#[derive(Debug, Clone, Copy)]
pub struct DeviceContext {
    pub timestep: usize,
}

impl DeviceContext {
    /// Creates a new DeviceContext for the given timestep.
    pub fn new(timestep: usize) -> Self {
        Self { timestep }
    }
}

/// A device that produces electricity.
pub trait Device {
    /// Returns the generated power at the given tick.
    ///
    /// # Arguments
    ///
    /// * `context` - Contextual information about the current tick
    ///
    /// # Returns
    ///
    /// Power in kilowatts (kW), never negative.
    fn power_kw(&mut self, context: &DeviceContext) -> f64;
}

/// Half-sine daylight profile: 0 outside `[sunrise_idx, sunset_idx)`, 1 at solar noon.
///
/// Timesteps wrap per day so multi-day replays repeat the profile.
pub fn daylight_frac(t: usize, steps_per_day: usize, sunrise_idx: usize, sunset_idx: usize) -> f64 {
    if steps_per_day == 0 || sunrise_idx >= sunset_idx {
        return 0.0;
    }
    let t = t % steps_per_day;
    if t < sunrise_idx || t >= sunset_idx {
        return 0.0;
    }
    let span = (sunset_idx - sunrise_idx) as f64;
    let x = (t - sunrise_idx) as f64 / span;
    (std::f64::consts::PI * x).sin().max(0.0)
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn daylight_is_zero_at_night_and_peaks_at_noon() {
        assert_eq!(daylight_frac(0, 24, 6, 18), 0.0);
        assert_eq!(daylight_frac(18, 24, 6, 18), 0.0);
        assert_eq!(daylight_frac(23, 24, 6, 18), 0.0);
        assert!(daylight_frac(6, 24, 6, 18) < 0.1);
        assert!(daylight_frac(12, 24, 6, 18) > 0.95);
        assert!((daylight_frac(9, 24, 6, 18) - daylight_frac(15, 24, 6, 18)).abs() < 1e-9);
    }

    #[test]
    fn daylight_wraps_across_days() {
        assert_eq!(daylight_frac(36, 24, 6, 18), daylight_frac(12, 24, 6, 18));
    }

    #[test]
    fn zero_std_means_no_noise() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gaussian_noise(&mut rng, 0.0), 0.0);
    }
}
