// Control side of the application: owns the session task, the link to the rig and the
// presenters, and maps user commands onto them.

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use uuid::Uuid;

use common::{TriggerSink, TriggerSource};
use kinematics_rs::{PipelineError, SessionPipeline, SessionTopic};
use photogate_rs::{
    available_ports, run_mock_service, run_service, MockConfig, PhotogateError, PhotogatePort,
    PhotogateService,
};
use publisher::listener;

use crate::presenters::{ConsolePresenter, PlotPresenter, WAITING_FOR_DROP};

const SESSION_TAG: &str = "Freefall";
const PLOT_REFRESH_PERIOD_MILLIS: u64 = 200;
const HELP: &str = "Commands: connect, disconnect, toggle, reset, release, refresh, help, quit";

pub enum RigKind {
    Serial(String),
    Simulated(MockConfig),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub plot: bool,
    pub json: bool,
}

/// What the controller needs from a connected rig, whatever its transport
#[async_trait]
trait Rig: Send + Sync {
    fn as_source(&self) -> &dyn TriggerSource;
    fn is_connected(&self) -> bool;
    async fn disconnect(&self);
    async fn reset_device(&self);
    async fn release(&self);
}

#[async_trait]
impl<C> Rig for PhotogateService<C>
where
    C: PhotogatePort + Send + Sync,
{
    fn as_source(&self) -> &dyn TriggerSource {
        self
    }

    fn is_connected(&self) -> bool {
        PhotogateService::is_connected(self)
    }

    async fn disconnect(&self) {
        PhotogateService::disconnect(self).await
    }

    async fn reset_device(&self) {
        PhotogateService::reset_device(self).await
    }

    async fn release(&self) {
        PhotogateService::release(self).await
    }
}

struct Connection {
    rig: Arc<dyn Rig>,
    handle: JoinHandle<()>,
    listener_id: Uuid,
    /// Timer releasing simulated drops, when they are not released by hand
    releaser: Option<JoinHandle<()>>,
}

/// Starts a new drop: clears the session, then asks the rig to release the object.
async fn start_drop(pipeline: &SessionPipeline, rig: &dyn Rig) -> Result<(), PipelineError> {
    pipeline.reset()?;
    rig.release().await;
    Ok(())
}

/// Releases the drops of a simulated rig one after the other, each in a fresh session.
async fn release_drops(rig: Arc<dyn Rig>, pipeline: Arc<SessionPipeline>, config: MockConfig) {
    let mut released = 0;
    while config.n_drops.map_or(true, |n| released < n) {
        tokio::time::sleep(config.scaled_pause()).await;
        if !rig.is_connected() {
            break;
        }
        if let Err(e) = start_drop(&pipeline, rig.as_ref()).await {
            warn!("Stopped releasing drops: {}", e);
            break;
        }
        released += 1;
        tokio::time::sleep(config.scaled_drop_duration()).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Connect,
    Disconnect,
    Toggle,
    Reset,
    Release,
    Refresh,
    Help,
    Quit,
}

impl FromStr for UserCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "connect" | "c" => Ok(UserCommand::Connect),
            "disconnect" | "d" => Ok(UserCommand::Disconnect),
            "toggle" | "t" => Ok(UserCommand::Toggle),
            "reset" | "r" => Ok(UserCommand::Reset),
            "release" | "s" => Ok(UserCommand::Release),
            "refresh" | "ports" | "p" => Ok(UserCommand::Refresh),
            "help" | "h" | "?" => Ok(UserCommand::Help),
            "quit" | "exit" | "q" => Ok(UserCommand::Quit),
            other => Err(format!("Unknown command '{}'", other)),
        }
    }
}

pub struct App {
    kind: RigKind,
    pipeline: Arc<SessionPipeline>,
    pipeline_handle: JoinHandle<()>,
    connection: Option<Connection>,
}

impl App {
    /// Starts the session task and attaches the presenters to it.
    pub fn new(kind: RigKind, output: OutputOptions) -> Result<Self> {
        let (pipeline_handle, pipeline) = kinematics_rs::run(SESSION_TAG);

        let console = Arc::new(ConsolePresenter::new(output.json));
        pipeline.register_listener(&mut listener!(console.handle), &SessionTopic::TriggerLog)?;
        pipeline.register_listener(&mut listener!(console.handle), &SessionTopic::Analysis)?;

        if output.plot {
            let plot = PlotPresenter::new();
            plot.start(PLOT_REFRESH_PERIOD_MILLIS);
            pipeline.register_listener(&mut listener!(plot.handle), &SessionTopic::Analysis)?;
        }

        Ok(Self {
            kind,
            pipeline,
            pipeline_handle,
            connection: None,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| connection.rig.is_connected())
    }

    /// Opens the link and attaches the session to it.
    /// On error the application stays disconnected.
    pub async fn connect(&mut self) -> Result<(), PhotogateError> {
        if self.is_connected() {
            println!("Already connected");
            return Ok(());
        }
        // A link that stopped on its own (Ctrl+C, end of run) is torn down first
        if self.connection.is_some() {
            self.disconnect().await;
        }

        let mut timed_drops = None;
        let (handle, rig): (JoinHandle<()>, Arc<dyn Rig>) = match &self.kind {
            RigKind::Serial(port_name) => {
                let (handle, service) = run_service(port_name, SESSION_TAG)?;
                (handle, service as Arc<dyn Rig>)
            }
            RigKind::Simulated(config) => {
                // Timed drops go through `start_drop` too, so each one gets its own session
                let rig_config = MockConfig {
                    auto_release: false,
                    ..config.clone()
                };
                let (handle, service) = run_mock_service(SESSION_TAG, rig_config, None)?;
                if config.auto_release {
                    timed_drops = Some(config.clone());
                }
                (handle, service as Arc<dyn Rig>)
            }
        };
        let listener_id = self.pipeline.attach_listener(rig.as_source());
        let releaser = timed_drops.map(|config| {
            tokio::spawn(release_drops(
                Arc::clone(&rig),
                Arc::clone(&self.pipeline),
                config,
            ))
        });
        info!("Connected to {}", rig.as_source().get_tag());
        self.connection = Some(Connection {
            rig,
            handle,
            listener_id,
            releaser,
        });
        Ok(())
    }

    /// Closes the link. The reader stops within one read timeout.
    pub async fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            println!("Not connected");
            return;
        };
        if let Some(releaser) = &connection.releaser {
            releaser.abort();
        }
        self.pipeline
            .detach_listener(connection.rig.as_source(), connection.listener_id);
        connection.rig.disconnect().await;
        if let Err(e) = connection.handle.await {
            warn!("Reader task ended abnormally: {}", e);
        }
        info!("Disconnected");
    }

    pub async fn toggle(&mut self) {
        if self.is_connected() {
            self.disconnect().await;
        } else if let Err(e) = self.connect().await {
            println!("Could not connect: {}", e);
        }
    }

    /// Clears the session and asks the rig to reset, if connected.
    pub async fn reset(&self) -> Result<()> {
        self.pipeline.reset()?;
        if let Some(connection) = &self.connection {
            connection.rig.reset_device().await;
        }
        Ok(())
    }

    /// Starts a new drop on the connected rig.
    pub async fn release(&self) -> Result<()> {
        match &self.connection {
            Some(connection) => start_drop(&self.pipeline, connection.rig.as_ref()).await?,
            None => println!("Not connected"),
        }
        Ok(())
    }

    fn refresh_ports(&self) {
        match available_ports() {
            Ok(ports) if ports.is_empty() => println!("No serial ports found"),
            Ok(ports) => {
                for port in ports {
                    println!("{}", port);
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    /// Applies one user command. Returns false when the application should stop.
    pub async fn execute(&mut self, command: UserCommand) -> Result<bool> {
        match command {
            UserCommand::Connect => {
                if let Err(e) = self.connect().await {
                    println!("Could not connect: {}", e);
                }
            }
            UserCommand::Disconnect => self.disconnect().await,
            UserCommand::Toggle => self.toggle().await,
            UserCommand::Reset => self.reset().await?,
            UserCommand::Release => self.release().await?,
            UserCommand::Refresh => self.refresh_ports(),
            UserCommand::Help => println!("{}", HELP),
            UserCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Connects, then reads commands from stdin until `quit`, end of input or Ctrl+C.
    pub async fn run_interactive(mut self) -> Result<()> {
        if let Err(e) = self.connect().await {
            println!("Could not connect: {}", e);
        }
        println!("{}", WAITING_FOR_DROP);
        println!("{}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<UserCommand>() {
                        Ok(command) => {
                            if !self.execute(command).await? {
                                break;
                            }
                        }
                        Err(e) => println!("{}. {}", e, HELP),
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        self.shutdown().await
    }

    /// Connects, lets the rig run for `duration`, then shuts down.
    pub async fn run_for(mut self, duration: Duration) -> Result<()> {
        self.connect().await?;
        println!("{}", WAITING_FOR_DROP);
        if let RigKind::Simulated(config) = &self.kind {
            if !config.auto_release {
                self.release().await?;
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
        self.shutdown().await
    }

    async fn shutdown(mut self) -> Result<()> {
        if self.connection.is_some() {
            self.disconnect().await;
        }
        self.pipeline.stop()?;
        self.pipeline_handle.await?;
        Ok(())
    }
}
