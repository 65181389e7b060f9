use chrono::{DateTime, Utc};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use super::fix_type::FixType;

/// A single resolved position estimate together with the receiver status known when it was
/// published.
///
/// Fields the provider could not resolve stay at zero, and `fix_type` stays at
/// [`FixType::Unknown`] when no satellite status side channel is available.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LocationFix {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub course: f64,
    pub satellite_count: u32,
    pub fix_type: FixType,
}

impl LocationFix {
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            ..Default::default()
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_course(mut self, course: f64) -> Self {
        self.course = course;
        self
    }

    pub fn with_status(mut self, satellite_count: u32, fix_type: FixType) -> Self {
        self.satellite_count = satellite_count;
        self.fix_type = fix_type;
        self
    }
}
