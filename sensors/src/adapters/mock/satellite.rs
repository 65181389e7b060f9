use std::sync::{Mutex, PoisonError};

use common::types::GnssEvent;

use crate::ports::{GnssEventHandler, SatelliteStatusSource};

/// Satellite status side channel whose events are pushed by hand with [`Self::emit`].
#[derive(Default)]
pub struct MockSatelliteStatus {
    handler: Mutex<Option<GnssEventHandler>>,
}

impl MockSatelliteStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to the registered handler, if any.
    pub fn emit(&self, event: GnssEvent) {
        let handler = self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(handler) = handler {
            handler(event);
        }
    }

    pub fn is_registered(&self) -> bool {
        self.handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl SatelliteStatusSource for MockSatelliteStatus {
    fn register(&self, handler: GnssEventHandler) {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    fn unregister(&self) {
        self.handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
