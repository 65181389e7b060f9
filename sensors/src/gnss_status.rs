use log::debug;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use common::types::{FixType, GnssEvent};
use common::Notifiable;
use publisher::{Publishable, Publisher, PublisherError};

/// Minimum number of usable satellites for a fix to be considered valid.
pub const MIN_VALID_SATELLITES: u32 = 4;

/// Receiver status folded into every published location fix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GnssStatus {
    pub fix_type: FixType,
    pub satellite_count: u32,
}

impl GnssStatus {
    pub fn is_valid_gps(&self) -> bool {
        self.fix_type == FixType::Fix3D && self.satellite_count >= MIN_VALID_SATELLITES
    }
}

/// Tracks fix type and satellite count from the satellite status side channel.
///
/// | event              | fix type         | satellite count          |
/// |--------------------|------------------|--------------------------|
/// | `Started`          | `AwaitingSignal` | unchanged                |
/// | `FirstFix`         | `Fix3D`          | unchanged                |
/// | `Stopped`          | `NoSignal`       | unchanged                |
/// | `SatelliteStatus`  | unchanged        | satellites with ephemeris|
///
/// The status is replaced as a whole value, so readers never observe a fix type from one
/// event paired with a satellite count from a half-applied other one.
pub struct GnssStatusTracker {
    status: watch::Sender<GnssStatus>,
    satellite_publisher: Publisher<u32>,
    fix_type_publisher: Publisher<FixType>,
}

impl Default for GnssStatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GnssStatusTracker {
    pub fn new() -> Self {
        let (status, _) = watch::channel(GnssStatus::default());
        Self {
            status,
            satellite_publisher: Publisher::new(),
            fix_type_publisher: Publisher::new(),
        }
    }

    /// Applies one side channel event.
    pub fn apply(&self, event: &GnssEvent) {
        if let GnssEvent::FirstFix { ttff_millis } = event {
            debug!("First fix acquired after {} ms", ttff_millis);
        }

        let mut next = GnssStatus::default();
        self.status.send_modify(|status| {
            match event {
                GnssEvent::Started => status.fix_type = FixType::AwaitingSignal,
                GnssEvent::FirstFix { .. } => status.fix_type = FixType::Fix3D,
                GnssEvent::Stopped => status.fix_type = FixType::NoSignal,
                GnssEvent::SatelliteStatus(_) => {
                    status.satellite_count =
                        event.usable_satellites().unwrap_or(status.satellite_count)
                }
            }
            next = *status;
        });

        // Lifecycle events always notify, mirroring the receiver callbacks.
        match event {
            GnssEvent::SatelliteStatus(_) => self
                .satellite_publisher
                .notify_listeners(Arc::new(next.satellite_count)),
            _ => self
                .fix_type_publisher
                .notify_listeners(Arc::new(next.fix_type)),
        }
    }

    pub fn status(&self) -> GnssStatus {
        *self.status.borrow()
    }

    pub fn fix_type(&self) -> FixType {
        self.status().fix_type
    }

    pub fn satellite_count(&self) -> u32 {
        self.status().satellite_count
    }

    /// True iff the receiver reports a 3D fix with at least [`MIN_VALID_SATELLITES`] satellites.
    pub fn is_valid_gps(&self) -> bool {
        self.status().is_valid_gps()
    }

    /// Receives the new satellite count on every satellite status update.
    pub fn register_satellite_listener(&self, listener: &mut dyn Notifiable<u32>) -> Uuid {
        self.satellite_publisher.register_listener(listener)
    }

    /// Receives the new fix type on every lifecycle event.
    pub fn register_fix_type_listener(&self, listener: &mut dyn Notifiable<FixType>) -> Uuid {
        self.fix_type_publisher.register_listener(listener)
    }

    pub fn unregister_listener(&self, id: Uuid) -> Result<(), PublisherError> {
        self.satellite_publisher
            .unregister_listener(id)
            .or_else(|_| self.fix_type_publisher.unregister_listener(id))
    }
}
