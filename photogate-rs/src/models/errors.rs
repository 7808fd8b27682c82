//! Module errors

use std::fmt;

/// Represents the different types of errors that can occur while talking to the photogate rig.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotogateError {
    /// The serial port could not be opened or closed.
    Transport(String),

    /// Reading from an open port failed.
    Read(String),

    /// A device command could not be delivered.
    Command(String),

    /// Available serial ports could not be listed.
    PortEnumeration(String),

    Other(String),
}

impl fmt::Display for PhotogateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotogateError::Transport(e) => write!(f, "transport error: {}", e),
            PhotogateError::Read(e) => write!(f, "read error: {}", e),
            PhotogateError::Command(e) => write!(f, "command error: {}", e),
            PhotogateError::PortEnumeration(e) => write!(f, "port enumeration error: {}", e),
            PhotogateError::Other(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PhotogateError {}
