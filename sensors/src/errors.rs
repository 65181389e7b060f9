//! Module errors

use std::time::Duration;
use thiserror::Error;

/// Represents the different types of errors that can occur while reading sensors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// A location request didn't complete within its timeout.
    #[error("Location request timed out after {0:?}")]
    Timeout(Duration),

    /// The location provider failed to resolve a fix.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A simulated driver was configured with invalid parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
