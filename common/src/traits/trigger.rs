use std::sync::Arc;
use uuid::Uuid;

use crate::traits::Notifiable;
use crate::types::RawTrigger;

/// Producer of photogate triggers (a serial device, a simulated drop...).
pub trait TriggerSource: Send + Sync {
    ///  Returns the tag identifying the source
    fn get_tag(&self) -> &str;
    /// Registers a listener and returns its id
    fn register_listener(&self, listener: &mut dyn Notifiable<RawTrigger>) -> Uuid;
    fn unregister_listener(&self, id: Uuid);
    /// Delivers a trigger to every registered listener
    fn notify_listeners(&self, trigger: Arc<RawTrigger>);
}

/// Consumer of photogate triggers.
pub trait TriggerSink: Send + Sync {
    fn attach_listener(&self, source: &dyn TriggerSource) -> Uuid;
    fn detach_listener(&self, source: &dyn TriggerSource, id: Uuid);
    /// Called by the source for every decoded trigger, in arrival order
    fn process_trigger(&self, listener_id: Uuid, trigger: Arc<RawTrigger>);
}
