use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::ports::{AccelerometerDriver, AccelerometerHandler};

/// Accelerometer driver whose hardware callbacks are triggered by hand with [`Self::emit`].
pub struct MockAccelerometer {
    supported: bool,
    handler: Mutex<Option<AccelerometerHandler>>,
    start_count: AtomicUsize,
}

impl Default for MockAccelerometer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAccelerometer {
    pub fn new() -> Self {
        Self {
            supported: true,
            handler: Mutex::new(None),
            start_count: AtomicUsize::new(0),
        }
    }

    /// Driver of a device without an accelerometer.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Simulates a hardware callback. Ignored while not monitoring.
    pub fn emit(&self, x: f64, y: f64, z: f64) {
        let handler = self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(handler) = handler {
            handler(x, y, z);
        }
    }

    pub fn has_handler(&self) -> bool {
        self.handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of times monitoring was started.
    pub fn start_count(&self) -> usize {
        self.start_count.load(Ordering::SeqCst)
    }
}

impl AccelerometerDriver for MockAccelerometer {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn is_monitoring(&self) -> bool {
        self.has_handler()
    }

    fn start(&self, handler: AccelerometerHandler) {
        self.start_count.fetch_add(1, Ordering::SeqCst);
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    fn stop(&self) {
        self.handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
