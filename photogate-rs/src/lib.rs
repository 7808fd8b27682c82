//! # Crate photogate-rs
//!
//! ## photogate-rs
//!
//! The `photogate-rs` crate reads the trigger stream of a free-fall photogate rig. The rig's
//! microcontroller prints one line per gate crossing over a serial link, holding the
//! microsecond timestamp of the crossing on the device clock. `photogate-rs` decodes those
//! lines into [`RawTrigger`](common::RawTrigger)s and delivers them, in arrival order, to the
//! registered listeners.
//!
//! Features include:
//! - Serial acquisition at a fixed baud rate, with reads bounded by a timeout so the reader
//!   notices a closed connection promptly.
//! - Silent dropping of lines that are not plain decimal timestamps.
//! - Best-effort device commands (reset, magnet release) whose failures are only logged.
//! - Serial port enumeration.
//! - A simulated rig producing the trigger lines of a drop, for running without hardware.
//!
//! **NOTE** Only connect-time failures are reported to the caller. Read errors are logged
//! and the reader keeps polling until the connection is closed.

pub(crate) mod adapters;
mod helpers;
pub(crate) mod models;
pub(crate) mod ports;
mod reader;
pub mod services;

pub use adapters::mock::{DropProfile, MockConfig, PhotogateMock};
pub use adapters::production::SerialPhotogate;
pub use models::connection::ConnectionState;
pub use models::errors::PhotogateError;
pub use models::shutdown::listen_for_shutdown;
pub use ports::PhotogatePort;
pub use services::{available_ports, run_mock_service, run_service, PhotogateService};
