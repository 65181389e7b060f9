#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

pub const N_XYZ_COORDINATES: usize = 3;

/// Instantaneous acceleration in device-local axes.
///
/// A reading is never mutated: every hardware callback produces a new value that
/// supersedes the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct AccelerometerReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerometerReading {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl TryFrom<Vec<f64>> for AccelerometerReading {
    type Error = &'static str;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        if value.len() != N_XYZ_COORDINATES {
            return Err("Can't convert to AccelerometerReading");
        }
        Ok(Self::new(value[0], value[1], value[2]))
    }
}
