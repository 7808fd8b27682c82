use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use common::traits::{TriggerSink, TriggerSource};
use common::RawTrigger;
use publisher::{listener, Listener};

type MockCallback<T> = Arc<Option<Arc<dyn Fn(MockValue, Uuid, Arc<T>) + Send + Sync>>>;

const POLL_PERIOD_MILLIS: u64 = 10;

#[derive(Clone, Debug, PartialEq)]
pub enum MockValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Default for MockValue {
    fn default() -> Self {
        MockValue::Int(0)
    }
}

/// Listener that keeps everything it is notified with, in notification order, and
/// optionally forwards it to a callback.
pub struct SinkMock<T> {
    received: Arc<Mutex<Vec<Arc<T>>>>,
    callback: MockCallback<T>,
    value: MockValue,
}

impl<T> Clone for SinkMock<T> {
    fn clone(&self) -> Self {
        Self {
            received: Arc::clone(&self.received),
            callback: Arc::clone(&self.callback),
            value: self.value.clone(),
        }
    }
}

impl<T> Default for SinkMock<T> {
    fn default() -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
            callback: Arc::new(None),
            value: MockValue::default(),
        }
    }
}

impl<T> SinkMock<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_callback<F>(&mut self, callback: F)
    where
        F: Fn(MockValue, Uuid, Arc<T>) + Send + Sync + 'static,
    {
        self.callback = Arc::new(Some(Arc::new(callback)));
    }

    pub fn set_value(&mut self, value: MockValue) {
        self.value = value;
    }

    /// A listener feeding this sink
    pub fn listener(&self) -> Listener<T> {
        listener!(self.handle)
    }

    pub fn handle(&self, id: Uuid, value: Arc<T>) {
        if let Some(cb) = self.callback.as_ref() {
            cb(self.value.clone(), id, Arc::clone(&value));
        }
        match self.received.lock() {
            Ok(mut received) => received.push(value),
            Err(poisoned) => poisoned.into_inner().push(value),
        }
    }

    pub fn received(&self) -> Vec<Arc<T>> {
        match self.received.lock() {
            Ok(received) => received.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.received().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Polls until at least `n` values arrived or `timeout` elapsed.
    /// Returns true if `n` values arrived.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        let poll = async {
            while self.len() < n {
                tokio::time::sleep(Duration::from_millis(POLL_PERIOD_MILLIS)).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.is_ok()
    }
}

impl TriggerSink for SinkMock<RawTrigger> {
    fn attach_listener(&self, source: &dyn TriggerSource) -> Uuid {
        let mut listener = self.listener();
        source.register_listener(&mut listener)
    }

    fn detach_listener(&self, source: &dyn TriggerSource, id: Uuid) {
        source.unregister_listener(id);
    }

    fn process_trigger(&self, listener_id: Uuid, trigger: Arc<RawTrigger>) {
        self.handle(listener_id, trigger);
    }
}

impl<T> std::fmt::Debug for SinkMock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkMock")
            .field("value", &self.value)
            .field("callback", &"<callback_fn>")
            .finish()
    }
}
