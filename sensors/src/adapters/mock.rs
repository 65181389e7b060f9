//! Drivers standing in for the platform sensor bindings.
//!
//! `Mock*` drivers are scripted from tests; `Simulated*` drivers generate noisy readings on
//! their own and back the `data-collector` binary.

mod accelerometer;
mod gaussian;
mod location;
mod satellite;
mod simulated;

pub use accelerometer::MockAccelerometer;
pub use location::MockLocationProvider;
pub use satellite::MockSatelliteStatus;
pub use simulated::{SimulatedAccelerometer, SimulatedLocationProvider, SimulatedSatelliteStatus};
