use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use common::types::AccelerometerReading;
use common::Notifiable;
use publisher::{Publishable, Publisher, PublisherError};

use crate::ports::{AccelerometerDriver, AccelerometerHandler};

/// Republishes hardware accelerometer callbacks as [`AccelerometerReading`] events.
///
/// Nothing is buffered: each listener receives every reading as it arrives and is expected
/// to keep only the latest one.
pub struct AccelerometerSource<D>
where
    D: AccelerometerDriver,
{
    driver: Arc<D>,
    publisher: Publisher<AccelerometerReading>,
}

impl<D> AccelerometerSource<D>
where
    D: AccelerometerDriver,
{
    pub fn new(driver: Arc<D>) -> Self {
        Self {
            driver,
            publisher: Publisher::new(),
        }
    }

    /// Begins hardware monitoring. Returns false, doing nothing, if the sensor is unsupported
    /// or already being monitored.
    pub fn start(&self) -> bool {
        if !self.driver.is_supported() {
            debug!("Accelerometer not supported");
            return false;
        }
        if self.driver.is_monitoring() {
            return false;
        }

        let publisher = self.publisher.clone();
        let handler: AccelerometerHandler = Arc::new(move |x, y, z| {
            publisher.notify_listeners(Arc::new(AccelerometerReading::new(x, y, z)));
        });
        self.driver.start(handler);
        info!("Accelerometer monitoring started");
        true
    }

    /// Halts monitoring and deregisters the hardware callback. Returns false if there was
    /// nothing to stop.
    pub fn stop(&self) -> bool {
        if !self.driver.is_supported() || !self.driver.is_monitoring() {
            return false;
        }
        self.driver.stop();
        info!("Accelerometer monitoring stopped");
        true
    }

    pub fn is_monitoring(&self) -> bool {
        self.driver.is_supported() && self.driver.is_monitoring()
    }

    pub fn register_listener(&self, listener: &mut dyn Notifiable<AccelerometerReading>) -> Uuid {
        self.publisher.register_listener(listener)
    }

    pub fn unregister_listener(&self, id: Uuid) -> Result<(), PublisherError> {
        self.publisher.unregister_listener(id)
    }
}
