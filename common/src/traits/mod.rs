pub mod publisher;
pub mod trigger;

pub use crate::traits::publisher::Notifiable;
pub use crate::traits::trigger::{TriggerSink, TriggerSource};
