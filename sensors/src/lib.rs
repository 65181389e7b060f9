//! # Crate sensors
//!
//! ## sensors
//!
//! The `sensors` crate wraps platform sensor drivers and republishes their readings as
//! structured events:
//!
//! - [`AccelerometerSource`] turns hardware accelerometer callbacks into
//!   [`AccelerometerReading`](common::AccelerometerReading) events.
//! - [`LocationSource`] polls a location provider in a background task, with a bounded
//!   timeout per request and a fixed delay between requests, and publishes
//!   [`LocationFix`](common::LocationFix) events.
//! - [`GnssStatusTracker`] follows the optional satellite status side channel and classifies
//!   the receiver fix type.
//!
//! Drivers are consumed through the traits in [`ports`]. Platform bindings are not part of this
//! crate; [`adapters::mock`] provides scripted drivers for tests and simulated ones for demos.

pub mod adapters;
pub mod constants;
pub mod errors;
pub mod gnss_status;
pub mod ports;
pub mod services;

pub use errors::SensorError;
pub use gnss_status::{GnssStatus, GnssStatusTracker};
pub use services::{AccelerometerSource, LocationConfig, LocationSource};
