//! General functionality for the `freefall` workspace
//!
//! Domain types shared by the trigger source, the kinematic pipeline and the
//! presenters, together with the build-time constants of the experiment rig.

pub mod constants;

#[doc(hidden)]
pub mod traits;
#[doc(hidden)]
pub mod types;

// Re-export traits
#[doc(inline)]
pub use traits::{Notifiable, TriggerSink, TriggerSource};

// Re-export types
#[doc(inline)]
pub use types::{
    Callback, DeviceCommand, RawTrigger, Sample, Series, SessionTag, TriggerParseError,
};
