// Acquisition of photogate triggers from the rig's microcontroller over a serial line.
// The device prints one decimal timestamp (microseconds) per line and accepts
// single-byte commands.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use tokio::io::{split, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use common::constants::{BAUD_RATE, READ_TIMEOUT_MILLIS};
use common::{DeviceCommand, RawTrigger};
use publisher::Publisher;

use crate::models::connection::ConnectionState;
use crate::models::errors::PhotogateError;
use crate::ports::PhotogatePort;
use crate::reader;

/// Serial link to the photogate rig
pub struct SerialPhotogate {
    port_name: String,
    tag: String,
    reader: Mutex<Option<BufReader<ReadHalf<SerialStream>>>>,
    writer: Mutex<Option<WriteHalf<SerialStream>>>,
    read_timeout: Duration,
}

impl SerialPhotogate {
    /// Opens `port_name` at the rig's baud rate.
    /// Returns a Transport error if the port cannot be opened.
    pub fn new(port_name: &str, tag: &str) -> Result<Self, PhotogateError> {
        let read_timeout = Duration::from_millis(READ_TIMEOUT_MILLIS);
        let serial = tokio_serial::new(port_name, BAUD_RATE)
            .timeout(read_timeout)
            .open_native_async()
            .map_err(|e| PhotogateError::Transport(format!("{}: {}", port_name, e)))?;
        let (rx, tx) = split(serial);
        info!("Opened {} at {} baud", port_name, BAUD_RATE);

        Ok(Self {
            port_name: port_name.to_string(),
            tag: tag.to_string(),
            reader: Mutex::new(Some(BufReader::new(rx))),
            writer: Mutex::new(Some(tx)),
            read_timeout,
        })
    }
}

#[async_trait]
impl PhotogatePort for SerialPhotogate {
    async fn start(
        &self,
        connection: ConnectionState,
        publisher: Option<Publisher<RawTrigger>>,
    ) -> Result<(), PhotogateError> {
        let serial_reader = self.reader.lock().await.take().ok_or_else(|| {
            PhotogateError::Other(format!("{} is already being read", self.port_name))
        })?;

        info!("Reading triggers from {}...", self.port_name);
        reader::read_triggers(serial_reader, &connection, publisher.as_ref(), self.read_timeout).await;
        info!("Stopped reading from {}", self.port_name);
        Ok(())
    }

    async fn send_command(&self, command: DeviceCommand) -> Result<(), PhotogateError> {
        let mut writer = self.writer.lock().await;
        let writer = writer
            .as_mut()
            .ok_or_else(|| PhotogateError::Command(format!("{} is closed", self.port_name)))?;
        writer
            .write_all(&[command.as_byte()])
            .await
            .map_err(|e| PhotogateError::Command(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| PhotogateError::Command(e.to_string()))
    }

    async fn close(&self) {
        if self.writer.lock().await.take().is_some() {
            info!("Closed {}", self.port_name);
        }
    }

    fn get_tag(&self) -> &str {
        self.tag.as_str()
    }
}
