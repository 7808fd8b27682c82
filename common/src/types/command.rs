/// Single-byte commands understood by the photogate firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    /// Clears the device side of the session.
    Reset,
    /// Drops the electromagnet and restarts the device timer.
    Release,
}

impl DeviceCommand {
    pub fn as_byte(&self) -> u8 {
        match self {
            DeviceCommand::Reset => b'R',
            DeviceCommand::Release => b'S',
        }
    }
}

impl From<DeviceCommand> for u8 {
    fn from(command: DeviceCommand) -> Self {
        command.as_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bytes() {
        assert_eq!(DeviceCommand::Reset.as_byte(), b'R');
        assert_eq!(u8::from(DeviceCommand::Release), b'S');
    }
}
