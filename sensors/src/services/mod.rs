pub mod accelerometer;
pub mod location;

pub use accelerometer::AccelerometerSource;
pub use location::{LocationConfig, LocationSource};
