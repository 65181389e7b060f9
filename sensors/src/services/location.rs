use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use common::types::LocationFix;
use common::Notifiable;
use publisher::{Publishable, Publisher, PublisherError};

use crate::constants::{POLL_DELAY_MILLIS, POLL_TIMEOUT_MILLIS};
use crate::errors::SensorError;
use crate::gnss_status::{GnssStatus, GnssStatusTracker};
use crate::ports::{FixRequest, GnssEventHandler, LocationDriver, RawLocation, SatelliteStatusSource};

/// Cadence of the location polling loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocationConfig {
    /// Upper bound for a single location request.
    pub poll_timeout: Duration,
    /// Pause between the end of one request and the start of the next.
    pub poll_delay: Duration,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(POLL_TIMEOUT_MILLIS),
            poll_delay: Duration::from_millis(POLL_DELAY_MILLIS),
        }
    }
}

struct PollLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Polls a [`LocationDriver`] in a background task and republishes every resolved fix as a
/// [`LocationFix`], augmented with the latest satellite count and fix type reported by the
/// optional satellite status side channel.
pub struct LocationSource<L>
where
    L: LocationDriver + 'static,
{
    driver: Arc<L>,
    side_channel: Option<Arc<dyn SatelliteStatusSource>>,
    tracker: Arc<GnssStatusTracker>,
    publisher: Publisher<LocationFix>,
    config: LocationConfig,
    poll_loop: Mutex<Option<PollLoop>>,
}

impl<L> LocationSource<L>
where
    L: LocationDriver + 'static,
{
    pub fn new(driver: Arc<L>, side_channel: Option<Arc<dyn SatelliteStatusSource>>) -> Self {
        Self::with_config(driver, side_channel, LocationConfig::default())
    }

    pub fn with_config(
        driver: Arc<L>,
        side_channel: Option<Arc<dyn SatelliteStatusSource>>,
        config: LocationConfig,
    ) -> Self {
        Self {
            driver,
            side_channel,
            tracker: Arc::new(GnssStatusTracker::new()),
            publisher: Publisher::new(),
            config,
            poll_loop: Mutex::new(None),
        }
    }

    /// Registers the side channel and spawns the polling loop, returning without waiting for
    /// the first fix. Returns false if the loop is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut poll_loop = self.lock_poll_loop();
        if poll_loop.is_some() {
            return false;
        }

        if let Some(side_channel) = self.side_channel.as_ref() {
            let tracker = self.tracker.clone();
            let handler: GnssEventHandler = Arc::new(move |event| tracker.apply(&event));
            side_channel.register(handler);
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_poll_loop(
            self.driver.clone(),
            self.tracker.clone(),
            self.publisher.clone(),
            self.config,
            cancel.clone(),
        ));
        *poll_loop = Some(PollLoop { cancel, handle });
        info!("Location polling started");
        true
    }

    /// Cancels the in-flight request, ends the polling loop and releases the side channel.
    /// Returns false if the loop was not running.
    pub fn stop(&self) -> bool {
        let Some(poll_loop) = self.lock_poll_loop().take() else {
            return false;
        };
        poll_loop.cancel.cancel();
        if let Some(side_channel) = self.side_channel.as_ref() {
            side_channel.unregister();
        }
        info!("Location polling stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.lock_poll_loop()
            .as_ref()
            .is_some_and(|poll_loop| !poll_loop.handle.is_finished())
    }

    pub fn status_tracker(&self) -> Arc<GnssStatusTracker> {
        self.tracker.clone()
    }

    /// True iff the side channel reports a 3D fix with at least four satellites.
    pub fn is_valid_gps(&self) -> bool {
        self.tracker.is_valid_gps()
    }

    pub fn config(&self) -> LocationConfig {
        self.config
    }

    pub fn register_listener(&self, listener: &mut dyn Notifiable<LocationFix>) -> Uuid {
        self.publisher.register_listener(listener)
    }

    pub fn unregister_listener(&self, id: Uuid) -> Result<(), PublisherError> {
        self.publisher.unregister_listener(id)
    }

    fn lock_poll_loop(&self) -> std::sync::MutexGuard<'_, Option<PollLoop>> {
        // The guarded state stays consistent even if a holder panicked.
        self.poll_loop
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<L> Drop for LocationSource<L>
where
    L: LocationDriver + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

pub(crate) fn build_fix(raw: RawLocation, status: GnssStatus) -> LocationFix {
    LocationFix::new(raw.timestamp, raw.latitude, raw.longitude)
        .with_altitude(raw.altitude.unwrap_or_default())
        .with_speed(raw.speed.unwrap_or_default())
        .with_course(raw.course.unwrap_or_default())
        .with_status(status.satellite_count, status.fix_type)
}

async fn run_poll_loop<L>(
    driver: Arc<L>,
    tracker: Arc<GnssStatusTracker>,
    publisher: Publisher<LocationFix>,
    config: LocationConfig,
    cancel: CancellationToken,
) where
    L: LocationDriver + 'static,
{
    let request = FixRequest::best(config.poll_timeout);

    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = tokio::time::timeout(config.poll_timeout, driver.current_location(&request)) => {
                outcome.unwrap_or(Err(SensorError::Timeout(config.poll_timeout)))
            }
        };

        match outcome {
            Ok(Some(raw)) => {
                let fix = build_fix(raw, tracker.status());
                publisher.notify_listeners(Arc::new(fix));
            }
            Ok(None) => debug!("Location provider returned no fix"),
            Err(e) => warn!("Error getting location: {}", e),
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(config.poll_delay) => {}
        }
    }
    debug!("Location polling loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockLocationProvider, MockSatelliteStatus};
    use chrono::Utc;
    use common::types::{FixType, GnssEvent, SatelliteInfo};
    use publisher::Listener;
    use tokio::time::sleep;

    fn fast_config() -> LocationConfig {
        LocationConfig {
            poll_timeout: Duration::from_millis(50),
            poll_delay: Duration::from_millis(10),
        }
    }

    fn raw_location(latitude: f64, longitude: f64) -> RawLocation {
        RawLocation {
            timestamp: Utc::now(),
            latitude,
            longitude,
            altitude: Some(850.0),
            speed: None,
            course: Some(90.0),
        }
    }

    fn collecting_listener(received: Arc<Mutex<Vec<LocationFix>>>) -> Listener<LocationFix> {
        Listener::new(move |_id: Uuid, fix: Arc<LocationFix>| {
            received.lock().unwrap().push((*fix).clone());
        })
    }

    #[test]
    fn test_build_fix_defaults_missing_fields() {
        let raw = RawLocation {
            timestamp: Utc::now(),
            latitude: 10.0,
            longitude: 20.0,
            ..Default::default()
        };
        let fix = build_fix(raw.clone(), GnssStatus::default());
        assert_eq!(fix.timestamp, raw.timestamp);
        assert_eq!(fix.altitude, 0.0);
        assert_eq!(fix.speed, 0.0);
        assert_eq!(fix.course, 0.0);
        assert_eq!(fix.satellite_count, 0);
        assert_eq!(fix.fix_type, FixType::Unknown);
    }

    #[tokio::test]
    async fn test_publishes_fixes() {
        let driver = Arc::new(MockLocationProvider::new());
        driver.push_fix(raw_location(-19.9, -43.9));
        let source = LocationSource::with_config(driver.clone(), None, fast_config());
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut listener = collecting_listener(received.clone());
        source.register_listener(&mut listener);

        assert!(source.start());
        assert!(!source.start());
        sleep(Duration::from_millis(100)).await;
        source.stop();

        let received = received.lock().unwrap();
        assert!(!received.is_empty());
        assert_eq!(received[0].latitude, -19.9);
        assert_eq!(received[0].altitude, 850.0);
        assert_eq!(received[0].speed, 0.0);
        assert_eq!(received[0].fix_type, FixType::Unknown);
    }

    #[tokio::test]
    async fn test_failed_polls_do_not_end_loop() {
        let driver = Arc::new(MockLocationProvider::new());
        driver.push_error(SensorError::Provider("no provider".to_string()));
        driver.push_none();
        driver.push_error(SensorError::Provider("still no provider".to_string()));
        driver.push_fix(raw_location(1.0, 2.0));
        let source = LocationSource::with_config(driver.clone(), None, fast_config());
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut listener = collecting_listener(received.clone());
        source.register_listener(&mut listener);

        source.start();
        sleep(Duration::from_millis(200)).await;
        assert!(source.is_running());
        source.stop();

        assert!(driver.call_count() >= 4);
        let received = received.lock().unwrap();
        assert!(!received.is_empty());
        assert!(received.iter().all(|fix| fix.latitude == 1.0));
    }

    #[tokio::test]
    async fn test_timed_out_poll_is_retried() {
        let driver = Arc::new(MockLocationProvider::new().with_delay(Duration::from_millis(500)));
        driver.push_fix(raw_location(1.0, 2.0));
        let source = LocationSource::with_config(driver.clone(), None, fast_config());
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut listener = collecting_listener(received.clone());
        source.register_listener(&mut listener);

        source.start();
        sleep(Duration::from_millis(250)).await;
        source.stop();

        assert!(driver.call_count() >= 2);
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stop_cancels_in_flight_request() {
        let driver = Arc::new(MockLocationProvider::new().with_delay(Duration::from_secs(10)));
        driver.push_fix(raw_location(1.0, 2.0));
        let config = LocationConfig {
            poll_timeout: Duration::from_secs(30),
            poll_delay: Duration::from_millis(10),
        };
        let source = LocationSource::with_config(driver.clone(), None, config);

        source.start();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(driver.call_count(), 1);
        assert!(source.stop());

        sleep(Duration::from_millis(50)).await;
        assert!(!source.is_running());
        assert_eq!(driver.call_count(), 1);
        assert_eq!(driver.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_stop_during_delay_exits_loop() {
        let driver = Arc::new(MockLocationProvider::new());
        driver.push_fix(raw_location(1.0, 2.0));
        let config = LocationConfig {
            poll_timeout: Duration::from_millis(50),
            poll_delay: Duration::from_secs(10),
        };
        let source = LocationSource::with_config(driver.clone(), None, config);

        source.start();
        sleep(Duration::from_millis(50)).await;
        source.stop();
        sleep(Duration::from_millis(50)).await;

        assert_eq!(driver.call_count(), 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let driver = Arc::new(MockLocationProvider::new());
        let source = LocationSource::with_config(driver, None, fast_config());

        assert!(!source.stop());
        source.start();
        assert!(source.stop());
        assert!(!source.stop());
    }

    #[tokio::test]
    async fn test_side_channel_status_folded_into_fix() {
        let driver = Arc::new(MockLocationProvider::new());
        driver.push_fix(raw_location(1.0, 2.0));
        let side_channel = Arc::new(MockSatelliteStatus::new());
        let source = LocationSource::with_config(
            driver.clone(),
            Some(side_channel.clone() as Arc<dyn SatelliteStatusSource>),
            fast_config(),
        );
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut listener = collecting_listener(received.clone());
        source.register_listener(&mut listener);

        assert!(!side_channel.is_registered());
        source.start();
        assert!(side_channel.is_registered());

        side_channel.emit(GnssEvent::Started);
        side_channel.emit(GnssEvent::FirstFix { ttff_millis: 2000 });
        side_channel.emit(GnssEvent::SatelliteStatus(
            (0..6).map(|svid| SatelliteInfo::new(svid, true, 35.0)).collect(),
        ));
        assert!(source.is_valid_gps());

        received.lock().unwrap().clear();
        sleep(Duration::from_millis(100)).await;
        source.stop();
        assert!(!side_channel.is_registered());

        let received = received.lock().unwrap();
        assert!(!received.is_empty());
        let last = received.last().unwrap();
        assert_eq!(last.satellite_count, 6);
        assert_eq!(last.fix_type, FixType::Fix3D);
    }

    #[tokio::test]
    async fn test_without_side_channel_gps_never_valid() {
        let driver = Arc::new(MockLocationProvider::new());
        let source = LocationSource::with_config(driver, None, fast_config());
        source.start();
        sleep(Duration::from_millis(30)).await;
        assert!(!source.is_valid_gps());
        source.stop();
    }
}
