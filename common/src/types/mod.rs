pub mod callback;
pub mod command;
pub mod sample;
pub mod series;
pub mod session_tag;
pub mod trigger;

pub use callback::Callback;
pub use command::DeviceCommand;
pub use sample::Sample;
pub use series::Series;
pub use session_tag::SessionTag;
pub use trigger::{RawTrigger, TriggerParseError};
