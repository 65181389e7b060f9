use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

use common::types::Snapshot;
use publisher::listener;
use publisher::Listener;

/// Snapshot sink that records everything it receives, in delivery order.
#[derive(Clone, Default)]
pub struct SinkMock {
    received: Arc<Mutex<Vec<Snapshot>>>,
}

impl SinkMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener forwarding to this sink, ready to be registered on a publisher.
    pub fn listener(&self) -> Listener<Snapshot> {
        listener!(self.process_snapshot)
    }

    pub fn process_snapshot(&self, _id: Uuid, snapshot: Arc<Snapshot>) {
        self.lock().push((*snapshot).clone());
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Waits until at least `count` snapshots arrived. Returns false if `timeout` elapses
    /// first.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.len() < count {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Snapshot>> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SinkMock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkMock")
            .field("received", &self.len())
            .finish()
    }
}
