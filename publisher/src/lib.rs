//! # Crate publisher
//!
//! ## publisher
//!
//! The `publisher` crate provides a mechanism for registering and notifying listeners
//! of new events of type `T`.
//!
//! Listeners wrap a callback (`Fn(Uuid, Arc<T>)`). A [`Publisher`] fans every
//! notification out to all of its listeners and only returns once each callback
//! has run, so successive notifications reach a given listener in the order they
//! were published. A [`PublisherManager`] groups publishers by topic.
//!
//! ### Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use uuid::Uuid;
//! use publisher::{Listener, Publishable, Publisher};
//!
//! let publisher = Publisher::<u64>::new();
//! let received = Arc::new(Mutex::new(Vec::new()));
//!
//! let mut listener = Listener::new({
//!     let received = received.clone();
//!     move |_id: Uuid, value: Arc<u64>| received.lock().unwrap().push(*value)
//! });
//! let id = publisher.register_listener(&mut listener);
//!
//! publisher.notify_listeners(Arc::new(120_034));
//! publisher.unregister_listener(id);
//! publisher.notify_listeners(Arc::new(250_112));
//!
//! assert_eq!(*received.lock().unwrap(), vec![120_034]);
//! ```

pub mod listener;
pub mod macros;
pub mod publisher;
pub mod publisher_manager;

pub use listener::Listener;
pub use publisher::{Publishable, Publisher};
pub use publisher_manager::{PublisherError, PublisherManager};
