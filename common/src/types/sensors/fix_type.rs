use std::fmt;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Quality classification of the GNSS receiver, driven by the satellite status side channel.
///
/// # Examples
///
/// ```
/// use common::types::sensors::FixType;
///
/// assert_eq!(FixType::default(), FixType::Unknown);
/// assert_eq!(FixType::Fix3D.to_string(), "3D Fix");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum FixType {
    #[default]
    Unknown,
    AwaitingSignal,
    Fix3D,
    NoSignal,
}

impl FixType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixType::Unknown => "Unknown",
            FixType::AwaitingSignal => "Awaiting signal",
            FixType::Fix3D => "3D Fix",
            FixType::NoSignal => "No signal",
        }
    }
}

impl fmt::Display for FixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FixType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim_matches('"') {
            "Unknown" => Ok(FixType::Unknown),
            "Awaiting signal" => Ok(FixType::AwaitingSignal),
            "3D Fix" => Ok(FixType::Fix3D),
            "No signal" => Ok(FixType::NoSignal),
            other => Err(format!("Unknown fix type {}", other)),
        }
    }
}
