use std::sync::Arc;
use uuid::Uuid;

use common::traits::Notifiable;
use common::types::Callback;

pub struct Listener<T> {
    callback: Callback<T>,
    id: Option<Uuid>,
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
            id: self.id,
        }
    }
}

impl<T> Listener<T>
where
    T: Send + Sync + 'static,
{
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Uuid, Arc<T>) + Send + Sync + 'static,
    {
        let callback = Arc::new(move |id: Uuid, data: Arc<T>| {
            callback(id, data);
        });

        Listener { callback, id: None }
    }

    /// Id assigned by the publisher at registration time
    pub fn get_id(&self) -> Option<Uuid> {
        self.id
    }
}

impl<T> Notifiable<T> for Listener<T>
where
    T: Send + Sync,
{
    fn get_callback(&self) -> Callback<T> {
        self.callback.clone()
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = Some(id);
    }
}
