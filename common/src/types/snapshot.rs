#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use super::sensors::{AccelerometerReading, LocationFix};

/// Latest known accelerometer and location state at the instant a sampling tick fires.
///
/// The two halves are not synchronized: each one is whatever its source published last,
/// so they may come from different instants.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub accelerometer: Option<AccelerometerReading>,
    pub location: Option<LocationFix>,
}

impl Snapshot {
    pub fn new(accelerometer: AccelerometerReading, location: LocationFix) -> Self {
        Self {
            accelerometer: Some(accelerometer),
            location: Some(location),
        }
    }

    /// Returns true when both halves are present.
    pub fn is_complete(&self) -> bool {
        self.accelerometer.is_some() && self.location.is_some()
    }
}
