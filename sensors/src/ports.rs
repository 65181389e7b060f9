//! Driver boundary consumed by the sensor adapters. Platform bindings implement these traits;
//! the crate ships mock and simulated implementations in [`crate::adapters::mock`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::types::GnssEvent;

use crate::errors::SensorError;

/// Handler invoked by the accelerometer driver with the raw `(x, y, z)` axis values.
pub type AccelerometerHandler = Arc<dyn Fn(f64, f64, f64) + Send + Sync>;

/// Handler invoked by the satellite status side channel.
pub type GnssEventHandler = Arc<dyn Fn(GnssEvent) + Send + Sync>;

pub trait AccelerometerDriver: Send + Sync {
    fn is_supported(&self) -> bool;
    fn is_monitoring(&self) -> bool;
    /// Starts hardware monitoring and routes every reading to `handler`.
    fn start(&self, handler: AccelerometerHandler);
    /// Stops monitoring and drops the registered handler.
    fn stop(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Accuracy {
    Lowest,
    Low,
    #[default]
    Medium,
    High,
    Best,
}

/// Parameters of a single-shot location request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixRequest {
    pub accuracy: Accuracy,
    pub timeout: Duration,
}

impl FixRequest {
    pub fn best(timeout: Duration) -> Self {
        Self {
            accuracy: Accuracy::Best,
            timeout,
        }
    }
}

/// Location as returned by the platform provider, before receiver status is folded in.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RawLocation {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub course: Option<f64>,
}

#[async_trait]
pub trait LocationDriver: Send + Sync {
    /// Requests the current location. `Ok(None)` means the provider answered without a fix.
    /// Dropping the returned future cancels the request.
    async fn current_location(
        &self,
        request: &FixRequest,
    ) -> Result<Option<RawLocation>, SensorError>;
}

/// Optional push channel reporting receiver lifecycle and satellite status.
pub trait SatelliteStatusSource: Send + Sync {
    fn register(&self, handler: GnssEventHandler);
    fn unregister(&self);
}
