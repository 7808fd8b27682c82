use publisher::listener;
use std::sync::Arc;
use uuid::Uuid;

use super::{SessionCommand, SessionPipeline};
use common::traits::{TriggerSink, TriggerSource};
use common::RawTrigger;

impl TriggerSink for SessionPipeline {
    fn attach_listener(&self, source: &dyn TriggerSource) -> Uuid {
        let mut listener = listener!(self.process_trigger);
        source.register_listener(&mut listener)
    }

    fn detach_listener(&self, source: &dyn TriggerSource, id: Uuid) {
        source.unregister_listener(id);
    }

    /// Runs on the reader. Only queues the trigger.
    fn process_trigger(&self, _listener_id: Uuid, trigger: Arc<RawTrigger>) {
        if let Err(e) = self.post(SessionCommand::Trigger(*trigger)) {
            self.warn_dropped(&trigger, e);
        }
    }
}
