use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Connection flag shared between the control side, which opens and closes the
/// connection, and the reader, which only observes it.
#[derive(Clone, Debug, Default)]
pub struct ConnectionState(Arc<AtomicBool>);

impl ConnectionState {
    /// A flag in the disconnected state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_connected(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set_connected(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true if the flag was set before the call
    pub fn disconnect(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}
