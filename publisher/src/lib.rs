//! # Crate publisher
//!
//! ## publisher
//!
//! The `publisher` crate provides a mechanism for registering and notifying listeners
//! of new events of type `T`.
//!
//! Sensor adapters publish their readings through a `Publisher`, and the sampler publishes
//! each `Snapshot` through one, so that the CSV logger and any presenter receive it.
//!
//! ### Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use publisher::{Listener, Publishable, Publisher};
//! use uuid::Uuid;
//!
//! let publisher = Publisher::<String>::new();
//! let received = Arc::new(Mutex::new(Vec::new()));
//!
//! // Register a listener
//! let mut listener = Listener::new({
//!     let received = received.clone();
//!     move |_id: Uuid, data: Arc<String>| received.lock().unwrap().push((*data).clone())
//! });
//! let listener_id = publisher.register_listener(&mut listener);
//!
//! // Notify all listeners
//! publisher.notify_listeners(Arc::new("Hello, World!".to_string()));
//! assert_eq!(received.lock().unwrap().len(), 1);
//!
//! // Unregister the listener
//! publisher.unregister_listener(listener_id).expect("Failed to unregister listener");
//! assert!(publisher.is_empty());
//! ```

pub mod listener;
pub mod macros;
pub mod publisher;

pub use listener::Listener;
pub use publisher::{Publishable, Publisher, PublisherError};
