//! Simulated source devices that feed the demo PV entity.

/// Solar photovoltaic generation model.
pub mod solar;
pub mod types;

// Re-export the main types for convenience
pub use solar::SolarPv;
pub use types::Device;
pub use types::DeviceContext;
