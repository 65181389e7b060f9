//! Module errors

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// The sampling interval must be strictly positive and small enough to schedule.
    #[error("Invalid sampling interval {0:?}")]
    InvalidInterval(Duration),

    #[error("Sampler already running")]
    AlreadyRunning,
}
