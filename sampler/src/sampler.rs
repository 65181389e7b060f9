use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use common::types::{AccelerometerReading, LocationFix, Snapshot};
use common::Notifiable;
use publisher::{Listener, Publishable, Publisher, PublisherError};
use sensors::ports::{AccelerometerDriver, LocationDriver};
use sensors::{AccelerometerSource, LocationSource};

use crate::errors::SamplerError;

struct Ticker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Caches the latest value published by each sensor source and, on a fixed interval, emits a
/// [`Snapshot`] of both to every registered listener.
///
/// A tick never waits for fresh data: until a source publishes, its half of the snapshot is
/// the zero-valued default. Each cache is a single-slot `watch` cell whose value is replaced
/// as a whole, so a tick never reads a partially written reading.
pub struct Sampler<A, L>
where
    A: AccelerometerDriver + 'static,
    L: LocationDriver + 'static,
{
    accelerometer: Arc<AccelerometerSource<A>>,
    location: Arc<LocationSource<L>>,
    last_accel: Arc<watch::Sender<AccelerometerReading>>,
    last_location: Arc<watch::Sender<LocationFix>>,
    publisher: Publisher<Snapshot>,
    ticker: Mutex<Option<Ticker>>,
    source_listeners: (Uuid, Uuid),
}

impl<A, L> Sampler<A, L>
where
    A: AccelerometerDriver + 'static,
    L: LocationDriver + 'static,
{
    pub fn new(accelerometer: Arc<AccelerometerSource<A>>, location: Arc<LocationSource<L>>) -> Self {
        let (last_accel, _) = watch::channel(AccelerometerReading::default());
        let (last_location, _) = watch::channel(LocationFix::default());
        let last_accel = Arc::new(last_accel);
        let last_location = Arc::new(last_location);

        let mut accel_listener = Listener::new({
            let last_accel = last_accel.clone();
            move |_id: Uuid, reading: Arc<AccelerometerReading>| {
                last_accel.send_replace(*reading);
            }
        });
        let mut location_listener = Listener::new({
            let last_location = last_location.clone();
            move |_id: Uuid, fix: Arc<LocationFix>| {
                last_location.send_replace((*fix).clone());
            }
        });
        let source_listeners = (
            accelerometer.register_listener(&mut accel_listener),
            location.register_listener(&mut location_listener),
        );

        Self {
            accelerometer,
            location,
            last_accel,
            last_location,
            publisher: Publisher::new(),
            ticker: Mutex::new(None),
            source_listeners,
        }
    }

    /// Starts both sensor sources and arms the periodic tick. Returns as soon as the timer is
    /// armed; the first snapshot is emitted one full `interval` later.
    ///
    /// Fails with [`SamplerError::InvalidInterval`] for a zero interval or one too large to
    /// schedule. Must be called from within a tokio runtime.
    pub fn start(&self, interval: Duration) -> Result<(), SamplerError> {
        if interval.is_zero() {
            return Err(SamplerError::InvalidInterval(interval));
        }
        let first_tick = Instant::now()
            .checked_add(interval)
            .ok_or(SamplerError::InvalidInterval(interval))?;
        let mut ticker = self.lock_ticker();
        if ticker.is_some() {
            return Err(SamplerError::AlreadyRunning);
        }

        self.accelerometer.start();
        self.location.start();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_ticker(
            first_tick,
            interval,
            self.last_accel.clone(),
            self.last_location.clone(),
            self.publisher.clone(),
            cancel.clone(),
        ));
        *ticker = Some(Ticker { cancel, handle });
        info!("Sampler started with interval {:?}", interval);
        Ok(())
    }

    /// Disarms the tick and stops both sensor sources. Safe to call repeatedly, or without a
    /// prior `start`.
    pub fn stop(&self) {
        if let Some(ticker) = self.lock_ticker().take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
            info!("Sampler stopped");
        }
        self.accelerometer.stop();
        self.location.stop();
    }

    pub fn is_running(&self) -> bool {
        self.lock_ticker().is_some()
    }

    /// Snapshot of the cached values as a tick would emit it right now.
    pub fn latest_snapshot(&self) -> Snapshot {
        take_snapshot(&self.last_accel, &self.last_location)
    }

    pub fn accelerometer(&self) -> &Arc<AccelerometerSource<A>> {
        &self.accelerometer
    }

    pub fn location(&self) -> &Arc<LocationSource<L>> {
        &self.location
    }

    /// Registers a listener receiving every emitted snapshot, in tick order.
    pub fn register_listener(&self, listener: &mut dyn Notifiable<Snapshot>) -> Uuid {
        self.publisher.register_listener(listener)
    }

    pub fn unregister_listener(&self, id: Uuid) -> Result<(), PublisherError> {
        self.publisher.unregister_listener(id)
    }

    fn lock_ticker(&self) -> MutexGuard<'_, Option<Ticker>> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A, L> Drop for Sampler<A, L>
where
    A: AccelerometerDriver + 'static,
    L: LocationDriver + 'static,
{
    fn drop(&mut self) {
        self.stop();
        let (accel_id, location_id) = self.source_listeners;
        let _ = self.accelerometer.unregister_listener(accel_id);
        let _ = self.location.unregister_listener(location_id);
    }
}

fn take_snapshot(
    last_accel: &watch::Sender<AccelerometerReading>,
    last_location: &watch::Sender<LocationFix>,
) -> Snapshot {
    let accelerometer = *last_accel.borrow();
    let location = last_location.borrow().clone();
    Snapshot::new(accelerometer, location)
}

async fn run_ticker(
    first_tick: Instant,
    period: Duration,
    last_accel: Arc<watch::Sender<AccelerometerReading>>,
    last_location: Arc<watch::Sender<LocationFix>>,
    publisher: Publisher<Snapshot>,
    cancel: CancellationToken,
) {
    let mut interval = interval_at(first_tick, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        let snapshot = Arc::new(take_snapshot(&last_accel, &last_location));
        // Listeners may block on I/O. Waiting here keeps deliveries in tick order.
        let delivery = publisher.clone();
        if let Err(e) =
            tokio::task::spawn_blocking(move || delivery.notify_listeners(snapshot)).await
        {
            warn!("Snapshot delivery failed: {}", e);
        }
    }
    debug!("Sampler tick loop exited");
}
