//! Data model shared by the sensor adapters, the sampler and the CSV logger.

#[doc(hidden)]
pub mod traits;
#[doc(hidden)]
pub mod types;

// Re-export traits
#[doc(inline)]
pub use traits::Notifiable;

// Re-export types
#[doc(inline)]
pub use types::{
    AccelerometerReading, Callback, FixType, GnssEvent, LocationFix, SatelliteInfo, Snapshot,
};
