use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use common::traits::Notifiable;
use common::types::Callback;

#[derive(Error, PartialEq, Clone, Debug)]
pub enum PublisherError {
    #[error("Listener with id {0} not found")]
    ListenerNotFound(Uuid),
}

pub trait Publishable<T> {
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid;
    fn unregister_listener(&self, listener_id: Uuid) -> Result<(), PublisherError>;
    fn unregister_all(&self);
    fn notify_listeners(&self, data: Arc<T>);
}

/// Record of registered listeners that will be notified of updates.
///
/// Cloning a `Publisher` shares the same set of listeners.
#[derive(Clone)]
pub struct Publisher<T> {
    listeners: Arc<DashMap<Uuid, Callback<T>>>,
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Publisher<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
        }
    }

    // Returns true if no listeners registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    // Returns number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Publishable<T> for Publisher<T>
where
    T: Send + Sync + 'static,
{
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid {
        let callback = listener.get_callback();
        let listener_id = Uuid::new_v4();
        listener.set_id(listener_id);
        self.listeners.insert(listener_id, callback);
        listener_id
    }

    fn unregister_all(&self) {
        self.listeners.clear();
    }

    /// Returns PublisherError::ListenerNotFound if no id matches any of the registered listeners
    fn unregister_listener(&self, listener_id: Uuid) -> Result<(), PublisherError> {
        self.listeners
            .remove(&listener_id)
            .map(|_| ())
            .ok_or(PublisherError::ListenerNotFound(listener_id))
    }

    /// Calls every registered listener and returns once all of them have returned, so that
    /// consecutive notifications reach each listener in order.
    fn notify_listeners(&self, data: Arc<T>) {
        let listeners: Vec<(Uuid, Callback<T>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        if listeners.len() <= 1 {
            for (id, callback) in listeners {
                callback(id, data.clone());
            }
            return;
        }

        listeners.into_par_iter().for_each(|(id, callback)| {
            let data = data.clone();
            callback(id, data);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{listener, listener::Listener};
    use std::sync::Mutex;

    struct TestHandler {
        data: Arc<Mutex<Vec<i32>>>,
    }

    impl TestHandler {
        fn new() -> Self {
            Self {
                data: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn handle(&self, _id: Uuid, value: Arc<i32>) {
            let mut data = self.data.lock().unwrap();
            data.push(*value);
        }
    }

    #[test]
    fn test_publisher_initialization() {
        let publisher = Publisher::<i32>::new();
        assert!(publisher.is_empty());
    }

    #[test]
    fn test_register_and_notify_listener() {
        let publisher = Publisher::new();
        let handler = Arc::new(TestHandler::new());

        let mut listener = Listener::new({
            let handler = handler.clone();
            move |id: Uuid, value| {
                handler.handle(id, value);
            }
        });

        let _listener_id = publisher.register_listener(&mut listener);
        publisher.notify_listeners(Arc::new(42));

        assert_eq!(*handler.data.lock().unwrap(), vec![42]);
    }

    #[test]
    fn test_register_and_notify_listener_macro() {
        let publisher = Publisher::new();
        let handler = Arc::new(TestHandler::new());

        let mut listener = listener!(handler.handle);

        let _listener_id = publisher.register_listener(&mut listener);
        publisher.notify_listeners(Arc::new(42));

        assert_eq!(*handler.data.lock().unwrap(), vec![42]);
    }

    #[test]
    fn test_notify_multiple_listeners_in_order() {
        let publisher = Publisher::new();
        let handler1 = Arc::new(TestHandler::new());
        let handler2 = Arc::new(TestHandler::new());

        let mut listener1 = listener!(handler1.handle);
        let mut listener2 = listener!(handler2.handle);
        publisher.register_listener(&mut listener1);
        publisher.register_listener(&mut listener2);
        assert_eq!(publisher.len(), 2);

        for value in 0..20 {
            publisher.notify_listeners(Arc::new(value));
        }

        let expected: Vec<i32> = (0..20).collect();
        assert_eq!(*handler1.data.lock().unwrap(), expected);
        assert_eq!(*handler2.data.lock().unwrap(), expected);
    }

    #[test]
    fn test_unregister_listener() {
        let publisher = Publisher::new();
        let handler = Arc::new(TestHandler::new());

        let mut listener = listener!(handler.handle);

        let listener_id = publisher.register_listener(&mut listener);
        assert_eq!(publisher.unregister_listener(listener_id), Ok(()));
        publisher.notify_listeners(Arc::new(100));

        // Should remain unchanged since listener was removed
        assert!(handler.data.lock().unwrap().is_empty());
        assert_eq!(
            publisher.unregister_listener(listener_id),
            Err(PublisherError::ListenerNotFound(listener_id))
        );
    }

    #[test]
    fn test_unregister_all() {
        let publisher = Publisher::<i32>::new();
        let handler = Arc::new(TestHandler::new());

        let mut listener1 = listener!(handler.handle);
        let mut listener2 = listener!(handler.handle);
        publisher.register_listener(&mut listener1);
        publisher.register_listener(&mut listener2);

        publisher.unregister_all();
        assert!(publisher.is_empty());
    }

    #[test]
    fn test_clones_share_listeners() {
        let publisher = Publisher::<i32>::new();
        let clone = publisher.clone();
        let handler = Arc::new(TestHandler::new());

        let mut listener = listener!(handler.handle);
        clone.register_listener(&mut listener);

        publisher.notify_listeners(Arc::new(7));
        assert_eq!(*handler.data.lock().unwrap(), vec![7]);
    }
}
