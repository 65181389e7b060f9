pub mod accelerometer_reading;
pub mod fix_type;
pub mod gnss_event;
pub mod location_fix;

pub use crate::types::sensors::accelerometer_reading::AccelerometerReading;
pub use crate::types::sensors::fix_type::FixType;
pub use crate::types::sensors::gnss_event::{GnssEvent, SatelliteInfo};
pub use crate::types::sensors::location_fix::LocationFix;
