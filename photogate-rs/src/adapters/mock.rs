// Simulated photogate rig. A device task prints the trigger lines of one or more drops into
// an in-memory pipe and the regular read loop decodes them, so the simulated path shares
// the framing and parsing of the serial one.

mod drop_profile;
mod gaussian;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::Notify;

use common::constants::READ_TIMEOUT_MILLIS;
use common::{DeviceCommand, RawTrigger};
use publisher::Publisher;

use crate::helpers;
use crate::models::connection::ConnectionState;
use crate::models::errors::PhotogateError;
use crate::ports::PhotogatePort;
use crate::reader;

pub use drop_profile::DropProfile;
use gaussian::GaussianNoise;

const DUPLEX_CAPACITY: usize = 1024;
const DEFAULT_DEVICE_EPOCH_MICROS: u64 = 3_000_000;
const DEFAULT_PAUSE_BETWEEN_DROPS_MILLIS: u64 = 500;
const MALFORMED_LINE: &str = "12a4\r\n";

/// Simulated rig behaviour
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub profile: DropProfile,
    /// Number of drops to simulate. `None` keeps dropping until disconnected.
    pub n_drops: Option<usize>,
    /// Drop on a timer instead of waiting for a Release command
    pub auto_release: bool,
    /// Standard deviation of the jitter added to every gate time (µs)
    pub timing_noise_micros: Option<f64>,
    /// Print a garbage line after the first gate of every drop
    pub inject_malformed: bool,
    pub pause_between_drops: Duration,
    /// Simulated seconds per wall-clock second
    pub time_scale: f64,
    /// Device clock reading when the simulation starts (µs)
    pub device_epoch_micros: u64,
    pub seed: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            profile: DropProfile::default(),
            n_drops: Some(1),
            auto_release: true,
            timing_noise_micros: None,
            inject_malformed: false,
            pause_between_drops: Duration::from_millis(DEFAULT_PAUSE_BETWEEN_DROPS_MILLIS),
            time_scale: 1.0,
            device_epoch_micros: DEFAULT_DEVICE_EPOCH_MICROS,
            seed: 0,
        }
    }
}

impl MockConfig {
    /// Wall-clock pause before every automatic drop
    pub fn scaled_pause(&self) -> Duration {
        scaled(self.pause_between_drops, self.time_scale)
    }

    /// Wall-clock time from the first to the last gate of a drop
    pub fn scaled_drop_duration(&self) -> Duration {
        let micros = self.profile.gate_offsets_micros().last().copied().unwrap_or(0);
        scaled(Duration::from_micros(micros), self.time_scale)
    }
}

/// Photogate rig emulator
pub struct PhotogateMock {
    tag: String,
    config: MockConfig,
    noise: Option<GaussianNoise>,
    release: Arc<Notify>,
    sent_commands: Mutex<Vec<DeviceCommand>>,
    read_timeout: Duration,
}

impl PhotogateMock {
    /// Creates a new simulated rig.
    /// Returns an Other error if the drop profile, the timing noise or the time scale are
    /// not usable.
    pub fn new(tag: &str, config: MockConfig) -> Result<Self, PhotogateError> {
        config.profile.validate()?;
        if !(config.time_scale.is_finite() && config.time_scale > 0.0) {
            return Err(PhotogateError::Other(format!(
                "Invalid time scale {}",
                config.time_scale
            )));
        }
        let noise = config
            .timing_noise_micros
            .map(|stdev| GaussianNoise::new(0.0, stdev))
            .transpose()?;

        Ok(Self {
            tag: tag.to_string(),
            config,
            noise,
            release: Arc::new(Notify::new()),
            sent_commands: Mutex::new(Vec::new()),
            read_timeout: Duration::from_millis(READ_TIMEOUT_MILLIS),
        })
    }

    /// Overrides the read timeout of the simulated link.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Commands received so far, oldest first
    pub fn get_sent_commands(&self) -> Vec<DeviceCommand> {
        match self.sent_commands.lock() {
            Ok(commands) => commands.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn get_config(&self) -> &MockConfig {
        &self.config
    }
}

#[async_trait]
impl PhotogatePort for PhotogateMock {
    async fn start(
        &self,
        connection: ConnectionState,
        publisher: Option<Publisher<RawTrigger>>,
    ) -> Result<(), PhotogateError> {
        let (device, host) = tokio::io::duplex(DUPLEX_CAPACITY);
        let device_task = tokio::spawn(simulate_drops(
            device,
            self.config.clone(),
            self.noise.clone(),
            connection.clone(),
            Arc::clone(&self.release),
        ));

        info!("Reading triggers from simulated rig {}...", self.tag);
        reader::read_triggers(
            BufReader::new(host),
            &connection,
            publisher.as_ref(),
            self.read_timeout,
        )
        .await;
        device_task.abort();
        info!("Stopped reading from simulated rig {}", self.tag);
        Ok(())
    }

    async fn send_command(&self, command: DeviceCommand) -> Result<(), PhotogateError> {
        debug!("Simulated rig received {:?}", command);
        if command == DeviceCommand::Release {
            self.release.notify_one();
        }
        match self.sent_commands.lock() {
            Ok(mut commands) => commands.push(command),
            Err(poisoned) => poisoned.into_inner().push(command),
        }
        Ok(())
    }

    async fn close(&self) {
        info!("Closed simulated rig {}", self.tag);
    }

    fn get_tag(&self) -> &str {
        self.tag.as_str()
    }
}

fn scaled(duration: Duration, time_scale: f64) -> Duration {
    Duration::from_secs_f64(duration.as_secs_f64() / time_scale)
}

/// Device side of the simulated link. Prints one line per gate crossing.
async fn simulate_drops(
    mut device: DuplexStream,
    config: MockConfig,
    noise: Option<GaussianNoise>,
    connection: ConnectionState,
    release: Arc<Notify>,
) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let offsets = config.profile.gate_offsets_micros();
    let drop_duration = offsets.last().copied().unwrap_or(0);
    let mut clock = config.device_epoch_micros;
    let mut n_drops = 0;

    while connection.is_connected() && config.n_drops.map_or(true, |n| n_drops < n) {
        if config.auto_release {
            tokio::time::sleep(config.scaled_pause()).await;
        } else {
            release.notified().await;
        }
        debug!("Simulated drop {} at {} µs", n_drops, clock);

        let mut elapsed = 0;
        for (gate, offset) in offsets.iter().enumerate() {
            let wait = Duration::from_micros(offset.saturating_sub(elapsed));
            tokio::time::sleep(scaled(wait, config.time_scale)).await;
            elapsed = *offset;

            let gate_time = (clock + offset) as f64;
            let gate_time = match &noise {
                Some(noise) => noise.add_noise(&mut rng, gate_time).round().max(0.0),
                None => gate_time,
            };
            let mut line = helpers::encode_line(RawTrigger::new(gate_time as u64));
            if gate == 0 && config.inject_malformed {
                line.push_str(MALFORMED_LINE);
            }
            if let Err(e) = device.write_all(line.as_bytes()).await {
                warn!("Simulated rig lost its reader: {}", e);
                return;
            }
        }

        clock += drop_duration + config.pause_between_drops.as_micros() as u64;
        n_drops += 1;
    }
    debug!("Simulated rig finished after {} drops", n_drops);
}

#[cfg(test)]
mod tests {
    use super::*;
    use publisher::{listener, Publishable};
    use uuid::Uuid;

    #[derive(Default)]
    struct Collector {
        triggers: Mutex<Vec<RawTrigger>>,
    }

    impl Collector {
        fn handle(&self, _id: Uuid, trigger: Arc<RawTrigger>) {
            self.triggers.lock().unwrap().push(*trigger);
        }
    }

    fn fast_config() -> MockConfig {
        MockConfig {
            pause_between_drops: Duration::from_millis(10),
            time_scale: 20.0,
            ..Default::default()
        }
    }

    async fn collect(mock: PhotogateMock, run_for_millis: u64) -> Vec<RawTrigger> {
        let collector = Arc::new(Collector::default());
        let publisher = Publisher::new();
        publisher.register_listener(&mut listener!(collector.handle));
        let connection = ConnectionState::connected();

        let stopper = {
            let connection = connection.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(run_for_millis)).await;
                connection.disconnect();
            })
        };
        mock.start(connection, Some(publisher)).await.unwrap();
        stopper.await.unwrap();

        let triggers = collector.triggers.lock().unwrap().clone();
        triggers
    }

    #[test]
    fn test_invalid_time_scale() {
        let config = MockConfig {
            time_scale: 0.0,
            ..Default::default()
        };
        assert!(PhotogateMock::new("Test", config).is_err());
    }

    #[test]
    fn test_invalid_profile() {
        let config = MockConfig {
            profile: DropProfile {
                entry_velocity: 0.0,
                gravity: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            PhotogateMock::new("Test", config),
            Err(PhotogateError::Other(_))
        ));
    }

    #[test]
    fn test_negative_noise() {
        let config = MockConfig {
            timing_noise_micros: Some(-5.0),
            ..Default::default()
        };
        assert!(PhotogateMock::new("Test", config).is_err());
    }

    #[tokio::test]
    async fn test_single_drop_matches_profile() {
        let config = fast_config();
        let expected: Vec<RawTrigger> = config
            .profile
            .gate_offsets_micros()
            .into_iter()
            .map(|offset| RawTrigger::new(config.device_epoch_micros + offset))
            .collect();
        let mock = PhotogateMock::new("Test", config)
            .unwrap()
            .with_read_timeout(Duration::from_millis(20));

        let triggers = collect(mock, 300).await;
        assert_eq!(triggers, expected);
    }

    #[tokio::test]
    async fn test_malformed_lines_are_dropped() {
        let config = MockConfig {
            inject_malformed: true,
            ..fast_config()
        };
        let n_gates = config.profile.n_gates;
        let mock = PhotogateMock::new("Test", config)
            .unwrap()
            .with_read_timeout(Duration::from_millis(20));

        let triggers = collect(mock, 300).await;
        assert_eq!(triggers.len(), n_gates);
    }

    #[tokio::test]
    async fn test_noise_is_reproducible() {
        let config = MockConfig {
            timing_noise_micros: Some(100.0),
            seed: 42,
            ..fast_config()
        };
        let mock1 = PhotogateMock::new("Test", config.clone())
            .unwrap()
            .with_read_timeout(Duration::from_millis(20));
        let mock2 = PhotogateMock::new("Test", config)
            .unwrap()
            .with_read_timeout(Duration::from_millis(20));

        let triggers1 = collect(mock1, 300).await;
        let triggers2 = collect(mock2, 300).await;
        assert!(!triggers1.is_empty());
        assert_eq!(triggers1, triggers2);
    }

    #[tokio::test]
    async fn test_waits_for_release() {
        let config = MockConfig {
            auto_release: false,
            ..fast_config()
        };
        let mock = Arc::new(
            PhotogateMock::new("Test", config)
                .unwrap()
                .with_read_timeout(Duration::from_millis(20)),
        );
        let collector = Arc::new(Collector::default());
        let publisher = Publisher::new();
        publisher.register_listener(&mut listener!(collector.handle));
        let connection = ConnectionState::connected();

        let reader_task = {
            let mock = Arc::clone(&mock);
            let connection = connection.clone();
            tokio::spawn(async move { mock.start(connection, Some(publisher)).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(collector.triggers.lock().unwrap().is_empty());

        mock.send_command(DeviceCommand::Release).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        connection.disconnect();
        reader_task.await.unwrap().unwrap();

        assert_eq!(
            collector.triggers.lock().unwrap().len(),
            mock.get_config().profile.n_gates
        );
        assert_eq!(mock.get_sent_commands(), vec![DeviceCommand::Release]);
    }

    #[tokio::test]
    async fn test_consecutive_drops_advance_the_clock() {
        let config = MockConfig {
            n_drops: Some(2),
            ..fast_config()
        };
        let n_gates = config.profile.n_gates;
        let mock = PhotogateMock::new("Test", config)
            .unwrap()
            .with_read_timeout(Duration::from_millis(20));

        let triggers = collect(mock, 500).await;
        assert_eq!(triggers.len(), 2 * n_gates);
        assert!(triggers.windows(2).all(|w| w[1] > w[0]));
    }
}
