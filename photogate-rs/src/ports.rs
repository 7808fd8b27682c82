use async_trait::async_trait;

use common::{DeviceCommand, RawTrigger};
use publisher::Publisher;

use crate::models::connection::ConnectionState;
use crate::models::errors::PhotogateError;

#[async_trait]
pub trait PhotogatePort {
    /// Reads triggers until `connection` is cleared, publishing each decoded trigger.
    /// Read errors are logged, not returned. Returns an error only if acquisition cannot start.
    async fn start(
        &self,
        connection: ConnectionState,
        publisher: Option<Publisher<RawTrigger>>,
    ) -> Result<(), PhotogateError>;

    /// Writes a single command byte to the device.
    async fn send_command(&self, command: DeviceCommand) -> Result<(), PhotogateError>;

    /// Releases the outbound side of the link.
    async fn close(&self);

    fn get_tag(&self) -> &str;
}
