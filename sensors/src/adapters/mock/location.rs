use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::errors::SensorError;
use crate::ports::{FixRequest, LocationDriver, RawLocation};

type Scripted = Result<Option<RawLocation>, SensorError>;

/// Location driver answering from a scripted queue.
///
/// Once the queue is exhausted every request returns the last fix handed out, or no fix if
/// there never was one.
pub struct MockLocationProvider {
    script: Mutex<VecDeque<Scripted>>,
    last_fix: Mutex<Option<RawLocation>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
}

// Decrements the in-flight counter when the request completes or is dropped.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for MockLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLocationProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last_fix: Mutex::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every request waits `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_fix(&self, location: RawLocation) {
        self.push(Ok(Some(location)));
    }

    pub fn push_none(&self) {
        self.push(Ok(None));
    }

    pub fn push_error(&self, error: SensorError) {
        self.push(Err(error));
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of requests started but neither answered nor cancelled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn push(&self, entry: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(entry);
    }

    fn next(&self) -> Scripted {
        let entry = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let mut last_fix = self.last_fix.lock().unwrap_or_else(PoisonError::into_inner);
        match entry {
            Some(Ok(Some(location))) => {
                *last_fix = Some(location.clone());
                Ok(Some(location))
            }
            Some(other) => other,
            None => Ok(last_fix.clone()),
        }
    }
}

#[async_trait]
impl LocationDriver for MockLocationProvider {
    async fn current_location(
        &self,
        _request: &FixRequest,
    ) -> Result<Option<RawLocation>, SensorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::new(self.in_flight.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_order_then_repeat_last_fix() {
        let provider = MockLocationProvider::new();
        let request = FixRequest::best(Duration::from_millis(200));
        let location = RawLocation {
            latitude: 3.0,
            ..Default::default()
        };
        provider.push_none();
        provider.push_error(SensorError::Provider("offline".to_string()));
        provider.push_fix(location.clone());

        assert_eq!(provider.current_location(&request).await, Ok(None));
        assert!(provider.current_location(&request).await.is_err());
        assert_eq!(
            provider.current_location(&request).await,
            Ok(Some(location.clone()))
        );
        assert_eq!(
            provider.current_location(&request).await,
            Ok(Some(location))
        );
        assert_eq!(provider.call_count(), 4);
        assert_eq!(provider.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_empty_script_returns_no_fix() {
        let provider = MockLocationProvider::new();
        let request = FixRequest::best(Duration::from_millis(200));
        assert_eq!(provider.current_location(&request).await, Ok(None));
    }
}
