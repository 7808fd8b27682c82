use std::sync::Arc;
use uuid::Uuid;

/// Listener callback. Runs on the notifying thread and must not block.
pub type Callback<T> = Arc<dyn Fn(Uuid, Arc<T>) + Send + Sync>;
