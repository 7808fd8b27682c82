use std::sync::Arc;
use uuid::Uuid;

use super::{SessionPipeline, SessionTopic, SessionUpdate};
use common::traits::Notifiable;
use publisher::PublisherError;

impl SessionPipeline {
    pub fn get_tag(&self) -> &str {
        self.tag.as_str()
    }

    pub fn get_available_topics(&self) -> Vec<SessionTopic> {
        self.publishers.get_available_publisher_types()
    }

    pub fn register_listener(
        &self,
        listener: &mut dyn Notifiable<SessionUpdate>,
        topic: &SessionTopic,
    ) -> Result<Uuid, PublisherError> {
        self.publishers.add_listener(listener, topic)
    }

    pub fn unregister_listener(&self, id: Uuid) {
        let _ = self.publishers.remove_listener(id);
    }

    pub fn notify_listeners(&self, topic: SessionTopic, update: Arc<SessionUpdate>) {
        self.publishers.notify_listeners(topic, update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_topics() {
        let pipeline = SessionPipeline::new("test");
        assert_eq!(pipeline.get_tag(), "test");
        assert_eq!(
            pipeline.get_available_topics(),
            vec![SessionTopic::TriggerLog, SessionTopic::Analysis]
        );
    }
}
