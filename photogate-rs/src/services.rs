use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::{
    mock::{MockConfig, PhotogateMock},
    production::SerialPhotogate,
};
use crate::models::connection::ConnectionState;
use crate::models::errors::PhotogateError;
use crate::models::shutdown;
use crate::ports::PhotogatePort;
use common::traits::{Notifiable, TriggerSource};
use common::{DeviceCommand, RawTrigger};
use publisher::{Publishable, Publisher};

/// Photogate service: owns the link to the rig, the connection flag and the
/// trigger publisher.
pub struct PhotogateService<C>
where
    C: PhotogatePort,
{
    client: C,
    publisher: Publisher<RawTrigger>,
    connection: ConnectionState,
}

impl<C> PhotogateService<C>
where
    C: PhotogatePort,
{
    pub fn new(client: C) -> Self {
        PhotogateService {
            client,
            publisher: Publisher::new(),
            connection: ConnectionState::new(),
        }
    }

    /// Marks the link as connected. Must precede [`start`](Self::start).
    pub fn connect(&self) {
        self.connection.set_connected();
    }

    /// Reads triggers until the connection flag is cleared, either by
    /// [`disconnect`](Self::disconnect), by Ctrl+C, or after `run_for_millis`.
    /// Returns immediately if the service is not connected.
    pub async fn start(&self, run_for_millis: Option<u64>) -> Result<(), PhotogateError> {
        let shutdown_handle = shutdown::listen_for_shutdown(self.connection.clone(), run_for_millis);
        let result = self
            .client
            .start(self.connection.clone(), Some(self.publisher.clone()))
            .await;
        self.connection.disconnect();
        shutdown_handle.abort();
        result
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn get_connection(&self) -> ConnectionState {
        self.connection.clone()
    }

    /// Clears the connection flag and closes the link. The reader stops within one
    /// read timeout.
    pub async fn disconnect(&self) {
        if self.connection.disconnect() {
            info!("Disconnecting from {}", self.client.get_tag());
        }
        self.client.close().await;
    }

    pub async fn send_command(&self, command: DeviceCommand) -> Result<(), PhotogateError> {
        self.client.send_command(command).await
    }

    /// Asks the rig to reset. Failures are logged and otherwise ignored.
    pub async fn reset_device(&self) {
        self.send_best_effort(DeviceCommand::Reset).await
    }

    /// Asks the rig to release the object. Failures are logged and otherwise ignored.
    pub async fn release(&self) {
        self.send_best_effort(DeviceCommand::Release).await
    }

    async fn send_best_effort(&self, command: DeviceCommand) {
        if !self.is_connected() {
            warn!("Not connected, {:?} command not sent", command);
            return;
        }
        match self.client.send_command(command).await {
            Ok(()) => info!("Sent {:?} command", command),
            Err(e) => warn!("Failed to send {:?} command: {}", command, e),
        }
    }

    pub fn get_client(&self) -> &C {
        &self.client
    }
}

impl<C> TriggerSource for PhotogateService<C>
where
    C: PhotogatePort + Send + Sync,
{
    fn get_tag(&self) -> &str {
        self.client.get_tag()
    }

    fn register_listener(&self, listener: &mut dyn Notifiable<RawTrigger>) -> Uuid {
        self.publisher.register_listener(listener)
    }

    fn unregister_listener(&self, id: Uuid) {
        self.publisher.unregister_listener(id);
    }

    fn notify_listeners(&self, trigger: Arc<RawTrigger>) {
        self.publisher.notify_listeners(trigger)
    }
}

/// Lists the serial ports the rig could be attached to, sorted by name.
/// Returns a PortEnumeration error if the ports cannot be listed.
pub fn available_ports() -> Result<Vec<String>, PhotogateError> {
    let mut ports: Vec<String> = tokio_serial::available_ports()
        .map_err(|e| PhotogateError::PortEnumeration(e.to_string()))?
        .into_iter()
        .map(|port| port.port_name)
        .collect();
    ports.sort();
    Ok(ports)
}

/// Opens `port_name` and starts reading triggers in a background task.
///
/// The task runs until the service is disconnected or Ctrl+C is received.
/// A Transport error is returned if the port cannot be opened.
///
/// # Returns
///
/// Returns a tuple containing:
/// * A `tokio::task::JoinHandle<()>` representing the spawned asynchronous task.
/// * An `Arc<PhotogateService<SerialPhotogate>>` instance, allowing further interaction with the rig.
pub fn run_service(
    port_name: &str,
    tag: &str,
) -> Result<
    (
        tokio::task::JoinHandle<()>,
        Arc<PhotogateService<SerialPhotogate>>,
    ),
    PhotogateError,
> {
    let client = SerialPhotogate::new(port_name, tag)?;
    let service = Arc::new(PhotogateService::new(client));
    service.connect();

    let handle = tokio::spawn({
        let service_clone = service.clone();
        async move {
            if let Err(e) = service_clone.start(None).await {
                error!("Error in photogate loop: {:?}", e);
            }
        }
    });
    Ok((handle, service))
}

/// Starts a simulated rig that prints the trigger lines of `config`'s drops.
///
/// Returns a tuple containing:
/// - A `tokio::task::JoinHandle<()>` representing the spawned asynchronous task.
/// - An `Arc<PhotogateService<PhotogateMock>>` instance, allowing further interaction with the rig.
///
/// The task stops after `run_for_millis`, or on Ctrl+C when no run time is given.
pub fn run_mock_service(
    tag: &str,
    config: MockConfig,
    run_for_millis: Option<u64>,
) -> Result<
    (
        tokio::task::JoinHandle<()>,
        Arc<PhotogateService<PhotogateMock>>,
    ),
    PhotogateError,
> {
    let client = PhotogateMock::new(tag, config)?;
    let service = Arc::new(PhotogateService::new(client));
    service.connect();

    let handle = tokio::spawn({
        let service_clone = service.clone();
        async move {
            if let Err(e) = service_clone.start(run_for_millis).await {
                error!("Error in photogate loop: {:?}", e);
            }
        }
    });
    Ok((handle, service))
}
