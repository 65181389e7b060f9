//! Periodic sampling of the latest accelerometer reading and location fix.
//!
//! [`Sampler`] listens to an [`AccelerometerSource`](sensors::AccelerometerSource) and a
//! [`LocationSource`](sensors::LocationSource), keeps the most recent value of each and emits
//! a [`Snapshot`](common::types::Snapshot) of both on a fixed interval.
pub mod constants;
pub mod errors;
mod sampler;
mod shutdown;

pub use errors::SamplerError;
pub use sampler::Sampler;

use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use sensors::ports::{AccelerometerDriver, LocationDriver};

/// Starts `sampler` with the given `period` and returns a handle to the task supervising it.
///
/// The task stops the sampler after `run_for_millis`, or on Ctrl+C when unset, or once
/// `shutdown` is cancelled.
pub fn run<A, L>(
    sampler: Arc<Sampler<A, L>>,
    period: Duration,
    run_for_millis: Option<u64>,
    shutdown: CancellationToken,
) -> Result<tokio::task::JoinHandle<()>, SamplerError>
where
    A: AccelerometerDriver + 'static,
    L: LocationDriver + 'static,
{
    sampler.start(period)?;
    let shutdown_task = shutdown::listen_for_shutdown(shutdown.clone(), run_for_millis);

    let handle = tokio::spawn(async move {
        shutdown.cancelled().await;
        sampler.stop();
        shutdown_task.abort();
        info!("Sampling finished");
    });
    Ok(handle)
}
