use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use common::types::{GnssEvent, SatelliteInfo};

use super::gaussian::GaussianNoise;
use crate::errors::SensorError;
use crate::ports::{
    AccelerometerDriver, AccelerometerHandler, FixRequest, GnssEventHandler, LocationDriver,
    RawLocation, SatelliteStatusSource,
};

const STANDARD_GRAVITY: f64 = 9.80665;
const ACCEL_STDEV: f64 = 0.05;
const POSITION_STDEV_METERS: f64 = 1.5;
const METERS_PER_DEGREE: f64 = 111_320.0;
const MIN_VISIBLE_SATELLITES: u32 = 6;
const MAX_VISIBLE_SATELLITES: u32 = 14;
const EPHEMERIS_PROBABILITY: f64 = 0.7;
const IDLE_STEP: Duration = Duration::from_millis(10);

// Background thread standing in for the platform callback thread.
struct Worker {
    running: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

impl Worker {
    fn spawn<F>(name: &str, body: F) -> Option<Self>
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        match thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(flag))
        {
            Ok(handle) => Some(Self { running, handle }),
            Err(e) => {
                warn!("Could not spawn {} thread: {}", name, e);
                None
            }
        }
    }

    fn shutdown(self) {
        self.running.store(false, Ordering::SeqCst);
        if self.handle.join().is_err() {
            warn!("Simulated sensor thread panicked");
        }
    }
}

// Sleeps for `duration` in short steps, returning false as soon as `running` is cleared.
fn sleep_while_running(running: &AtomicBool, duration: Duration) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let step = remaining.min(IDLE_STEP);
        thread::sleep(step);
        remaining -= step;
    }
    running.load(Ordering::SeqCst)
}

/// Accelerometer driver producing a device lying flat, plus Gaussian noise, at a fixed rate.
pub struct SimulatedAccelerometer {
    period: Duration,
    noise: GaussianNoise,
    worker: Mutex<Option<Worker>>,
}

impl SimulatedAccelerometer {
    pub fn new(period: Duration) -> Result<Self, SensorError> {
        if period.is_zero() {
            return Err(SensorError::InvalidConfig(
                "accelerometer period must be positive".to_string(),
            ));
        }
        Ok(Self {
            period,
            noise: GaussianNoise::new(0.0, ACCEL_STDEV)?,
            worker: Mutex::new(None),
        })
    }
}

impl AccelerometerDriver for SimulatedAccelerometer {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_monitoring(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn start(&self, handler: AccelerometerHandler) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            return;
        }
        let period = self.period;
        let noise = self.noise.clone();
        *worker = Worker::spawn("simulated-accelerometer", move |running| {
            let mut rng = StdRng::from_entropy();
            while running.load(Ordering::SeqCst) {
                handler(
                    noise.add_noise(&mut rng, 0.0),
                    noise.add_noise(&mut rng, 0.0),
                    noise.add_noise(&mut rng, STANDARD_GRAVITY),
                );
                if !sleep_while_running(&running, period) {
                    break;
                }
            }
        });
    }

    fn stop(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            worker.shutdown();
        }
    }
}

impl Drop for SimulatedAccelerometer {
    fn drop(&mut self) {
        AccelerometerDriver::stop(self);
    }
}

#[derive(Clone, Debug)]
struct Track {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    speed: f64,
    course: f64,
    last_update: Option<DateTime<Utc>>,
}

impl Track {
    // Moves along the current course for the time elapsed since the previous update.
    fn advance(&mut self, now: DateTime<Utc>) {
        if let Some(last_update) = self.last_update {
            let elapsed_secs = (now - last_update).num_milliseconds().max(0) as f64 / 1000.0;
            let distance = self.speed * elapsed_secs;
            let course = self.course.to_radians();
            self.latitude += distance * course.cos() / METERS_PER_DEGREE;
            self.longitude +=
                distance * course.sin() / (METERS_PER_DEGREE * self.latitude.to_radians().cos());
        }
        self.last_update = Some(now);
    }
}

/// Location driver following a straight track at constant speed, with position jitter,
/// a fixed answer latency and an optional rate of failed requests.
pub struct SimulatedLocationProvider {
    track: Mutex<Track>,
    position_noise: GaussianNoise,
    latency: Duration,
    failure_rate: f64,
}

impl SimulatedLocationProvider {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SensorError> {
        Ok(Self {
            track: Mutex::new(Track {
                latitude,
                longitude,
                altitude: 0.0,
                speed: 0.0,
                course: 0.0,
                last_update: None,
            }),
            position_noise: GaussianNoise::new(0.0, POSITION_STDEV_METERS / METERS_PER_DEGREE)?,
            latency: Duration::from_millis(20),
            failure_rate: 0.0,
        })
    }

    pub fn with_motion(self, altitude: f64, speed: f64, course: f64) -> Self {
        {
            let mut track = self.track.lock().unwrap_or_else(PoisonError::into_inner);
            track.altitude = altitude;
            track.speed = speed;
            track.course = course;
        }
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fraction of requests, in `[0, 1]`, answered with a provider error.
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Result<Self, SensorError> {
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(SensorError::InvalidConfig(format!(
                "failure rate {} outside [0, 1]",
                failure_rate
            )));
        }
        self.failure_rate = failure_rate;
        Ok(self)
    }

    fn resolve(&self) -> Result<Option<RawLocation>, SensorError> {
        let mut rng = rand::thread_rng();
        if rng.gen_bool(self.failure_rate) {
            return Err(SensorError::Provider("simulated signal loss".to_string()));
        }

        let now = Utc::now();
        let mut track = self.track.lock().unwrap_or_else(PoisonError::into_inner);
        track.advance(now);
        Ok(Some(RawLocation {
            timestamp: now,
            latitude: self.position_noise.add_noise(&mut rng, track.latitude),
            longitude: self.position_noise.add_noise(&mut rng, track.longitude),
            altitude: Some(track.altitude),
            speed: Some(track.speed),
            course: Some(track.course),
        }))
    }
}

#[async_trait]
impl LocationDriver for SimulatedLocationProvider {
    async fn current_location(
        &self,
        request: &FixRequest,
    ) -> Result<Option<RawLocation>, SensorError> {
        if self.latency > request.timeout {
            tokio::time::sleep(request.timeout).await;
            return Err(SensorError::Timeout(request.timeout));
        }
        tokio::time::sleep(self.latency).await;
        self.resolve()
    }
}

/// Side channel reporting receiver start, a first fix after `time_to_first_fix`, and then
/// periodic satellite status updates until unregistered, which reports the receiver stopped.
pub struct SimulatedSatelliteStatus {
    time_to_first_fix: Duration,
    status_period: Duration,
    worker: Mutex<Option<Worker>>,
}

impl SimulatedSatelliteStatus {
    pub fn new(time_to_first_fix: Duration, status_period: Duration) -> Self {
        Self {
            time_to_first_fix,
            status_period: status_period.max(IDLE_STEP),
            worker: Mutex::new(None),
        }
    }
}

fn random_constellation<R: Rng>(rng: &mut R) -> Vec<SatelliteInfo> {
    let visible = rng.gen_range(MIN_VISIBLE_SATELLITES..=MAX_VISIBLE_SATELLITES);
    (1..=visible)
        .map(|svid| {
            SatelliteInfo::new(
                svid,
                rng.gen_bool(EPHEMERIS_PROBABILITY),
                rng.gen_range(15.0..45.0),
            )
        })
        .collect()
}

impl SatelliteStatusSource for SimulatedSatelliteStatus {
    fn register(&self, handler: GnssEventHandler) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            return;
        }
        let time_to_first_fix = self.time_to_first_fix;
        let status_period = self.status_period;
        *worker = Worker::spawn("simulated-gnss-status", move |running| {
            let mut rng = StdRng::from_entropy();
            handler(GnssEvent::Started);
            if sleep_while_running(&running, time_to_first_fix) {
                handler(GnssEvent::FirstFix {
                    ttff_millis: time_to_first_fix.as_millis() as u32,
                });
                while sleep_while_running(&running, status_period) {
                    handler(GnssEvent::SatelliteStatus(random_constellation(&mut rng)));
                }
            }
            handler(GnssEvent::Stopped);
            debug!("Simulated GNSS status stopped");
        });
    }

    fn unregister(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            worker.shutdown();
        }
    }
}

impl Drop for SimulatedSatelliteStatus {
    fn drop(&mut self) {
        self.unregister();
    }
}
