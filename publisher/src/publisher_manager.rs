use dashmap::DashMap;
use std::cmp::Eq;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use uuid::Uuid;

use crate::Publishable;

use super::publisher::Publisher;
use common::traits::publisher::Notifiable;

#[derive(PartialEq, Clone, Debug)]
pub enum PublisherError {
    /// No publisher registered for the requested topic
    PublisherNotFound,
    ListenerNotFound(Uuid),
}

impl fmt::Display for PublisherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublisherError::PublisherNotFound => write!(f, "Publisher doesnt exist"),
            PublisherError::ListenerNotFound(id) => write!(f, "Listener Id {} not found", id),
        }
    }
}

impl std::error::Error for PublisherError {}

/// This module defines the `PublisherManager` struct, which manages one publisher per topic and
/// the listeners attached to them. Topics are ordered through their `usize` index.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use uuid::Uuid;
/// use publisher::{listener, PublisherManager};
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Topic {
///     Log,
///     Analysis,
/// }
///
/// impl From<Topic> for usize {
///     fn from(topic: Topic) -> usize {
///         topic as usize
///     }
/// }
///
/// struct Console;
///
/// impl Console {
///     fn handle(&self, _id: Uuid, line: Arc<String>) {
///         println!("{}", line);
///     }
/// }
///
/// let manager = PublisherManager::<String, Topic>::new(&[Topic::Log, Topic::Analysis]);
///
/// let console = Arc::new(Console);
/// let mut listener = listener!(console.handle);
/// let id = manager.add_listener(&mut listener, &Topic::Log).unwrap();
///
/// manager.notify_listeners(Topic::Log, Arc::new("120034 µs".to_string()));
/// manager.remove_listener(id).unwrap();
/// ```
pub struct PublisherManager<T, S> {
    publishers: Arc<DashMap<S, Publisher<T>>>,
    control: Arc<DashMap<Uuid, S>>,
}

impl<T, S> Clone for PublisherManager<T, S> {
    fn clone(&self) -> Self {
        Self {
            publishers: Arc::clone(&self.publishers),
            control: Arc::clone(&self.control),
        }
    }
}

impl<T, S> PublisherManager<T, S>
where
    T: Send + Sync + 'static,
    S: Send + Sync + Hash + Eq + Clone + Into<usize>,
{
    pub fn new(publisher_types: &[S]) -> Self {
        let collection = DashMap::<S, Publisher<T>>::new();
        for publisher_type in publisher_types {
            collection.insert(publisher_type.clone(), Publisher::new());
        }

        Self {
            publishers: Arc::new(collection),
            control: Arc::new(DashMap::new()),
        }
    }

    pub fn get_available_publisher_types(&self) -> Vec<S> {
        let mut publisher_types: Vec<S> = self
            .publishers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        publisher_types.sort_by_key(|publisher_type| (publisher_type.clone()).into());
        publisher_types
    }

    pub fn add_listener(
        &self,
        listener: &mut dyn Notifiable<T>,
        publisher_type: &S,
    ) -> Result<Uuid, PublisherError> {
        if let Some(publisher) = self.publishers.get(publisher_type) {
            let id = publisher.register_listener(listener);
            self.control.insert(id, publisher_type.clone());
            return Ok(id);
        }
        Err(PublisherError::PublisherNotFound)
    }

    pub fn remove_listener(&self, id: Uuid) -> Result<(), PublisherError> {
        if let Some((_, publisher_type)) = self.control.remove(&id) {
            if let Some(publisher) = self.publishers.get(&publisher_type) {
                publisher.unregister_listener(id);
            } else {
                return Err(PublisherError::PublisherNotFound);
            }
            return Ok(());
        }
        Err(PublisherError::ListenerNotFound(id))
    }

    pub fn notify_listeners(&self, publisher_type: S, data: Arc<T>) {
        // Clone out of the map so no shard lock is held while callbacks run
        let publisher = self
            .publishers
            .get(&publisher_type)
            .map(|entry| entry.value().clone());
        if let Some(publisher) = publisher {
            publisher.notify_listeners(data);
        }
    }
}
