use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use common::traits::Notifiable;
use common::types::Callback;

pub trait Publishable<T> {
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid;
    fn unregister_listener(&self, listener_id: Uuid) -> bool;
    fn notify_listeners(&self, data: Arc<T>);
}

/// Clones share the same listeners.
pub struct Publisher<T> {
    listeners: Arc<DashMap<Uuid, Callback<T>>>,
}

// Not derived: the payload itself never needs to be Clone
impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
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

    /// Returns false if no listener with that id was registered
    fn unregister_listener(&self, listener_id: Uuid) -> bool {
        self.listeners.remove(&listener_id).is_some()
    }

    /// Runs every callback, possibly in parallel, and returns once all of them are done.
    fn notify_listeners(&self, data: Arc<T>) {
        let listeners: Vec<(Uuid, Callback<T>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        listeners.into_par_iter().for_each(|(id, callback)| {
            let data = data.clone();
            callback(id, data);
        });
    }
}
