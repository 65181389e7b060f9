#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Per-satellite entry of a satellite status update.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SatelliteInfo {
    pub svid: u32,
    /// Satellite currently reports usable ranging data.
    pub has_ephemeris: bool,
    pub cn0_dbhz: f64,
}

impl SatelliteInfo {
    pub fn new(svid: u32, has_ephemeris: bool, cn0_dbhz: f64) -> Self {
        Self {
            svid,
            has_ephemeris,
            cn0_dbhz,
        }
    }
}

/// Lifecycle and status notifications pushed by the receiver independently of the poll loop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum GnssEvent {
    Started,
    FirstFix { ttff_millis: u32 },
    Stopped,
    SatelliteStatus(Vec<SatelliteInfo>),
}

impl GnssEvent {
    /// Number of satellites with ephemeris data, or `None` if the event is not a status update.
    pub fn usable_satellites(&self) -> Option<u32> {
        match self {
            GnssEvent::SatelliteStatus(satellites) => {
                Some(satellites.iter().filter(|s| s.has_ephemeris).count() as u32)
            }
            _ => None,
        }
    }
}
