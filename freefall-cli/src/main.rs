mod app;
mod presenters;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::time::Duration;

use app::{App, OutputOptions, RigKind};
use photogate_rs::{DropProfile, MockConfig};

#[derive(Parser)]
#[command(name = "Freefall")]
#[command(bin_name = "freefall")]
#[command(about = "Measures g by timing a falling object through a column of photogates")]
struct Cli {
    /// Log debug messages (RUST_LOG takes precedence)
    #[clap(long, short, action, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List the serial ports the rig could be attached to")]
    Ports,
    Run(RunArgs),
    Simulate(SimulateArgs),
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Plot samples and fitted curve with gnuplot
    #[clap(long, action)]
    plot: bool,

    /// Print session updates as JSON lines
    #[clap(long, action)]
    json: bool,
}

impl From<&OutputArgs> for OutputOptions {
    fn from(args: &OutputArgs) -> Self {
        OutputOptions {
            plot: args.plot,
            json: args.json,
        }
    }
}

#[derive(clap::Args)]
#[command(about = "Acquire drops from the rig on a serial port")]
struct RunArgs {
    /// Serial port the rig is attached to, see `freefall ports`
    #[arg(long)]
    port: String,

    #[clap(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
#[command(about = "Acquire drops from a simulated rig")]
struct SimulateArgs {
    /// Number of drops, 0 to keep dropping until disconnected
    #[arg(long, default_value_t = 1)]
    drops: usize,

    /// Speed at the first gate (m/s)
    #[arg(long)]
    entry_velocity: Option<f64>,

    /// Simulated acceleration (m/s^2)
    #[arg(long)]
    gravity: Option<f64>,

    /// Standard deviation of the gate timing jitter (µs)
    #[arg(long)]
    noise_micros: Option<f64>,

    /// Emit a malformed line in every drop
    #[arg(long, action)]
    malformed: bool,

    /// Wait for the release command instead of dropping on a timer
    #[arg(long, action)]
    manual_release: bool,

    /// Simulated seconds per wall-clock second
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Stop after this many milliseconds instead of reading commands from stdin
    #[arg(long)]
    run_for_millis: Option<u64>,

    #[clap(flatten)]
    output: OutputArgs,
}

impl SimulateArgs {
    fn mock_config(&self) -> MockConfig {
        let default_profile = DropProfile::default();
        MockConfig {
            profile: DropProfile {
                entry_velocity: self.entry_velocity.unwrap_or(default_profile.entry_velocity),
                gravity: self.gravity.unwrap_or(default_profile.gravity),
                ..default_profile
            },
            n_drops: (self.drops > 0).then_some(self.drops),
            auto_release: !self.manual_release,
            timing_noise_micros: self.noise_micros,
            inject_malformed: self.malformed,
            time_scale: self.time_scale,
            seed: self.seed,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .try_init();

    match args.command {
        Commands::Ports => {
            for port in photogate_rs::available_ports()? {
                println!("{}", port);
            }
            Ok(())
        }
        Commands::Run(run_args) => {
            let app = App::new(RigKind::Serial(run_args.port), (&run_args.output).into())?;
            app.run_interactive().await
        }
        Commands::Simulate(simulate_args) => {
            let kind = RigKind::Simulated(simulate_args.mock_config());
            let app = App::new(kind, (&simulate_args.output).into())?;
            match simulate_args.run_for_millis {
                Some(millis) => app.run_for(Duration::from_millis(millis)).await,
                None => app.run_interactive().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::parse_from([
            "freefall",
            "simulate",
            "--drops",
            "0",
            "--gravity",
            "9.7",
            "--manual-release",
            "--json",
        ]);
        let Commands::Simulate(args) = cli.command else {
            panic!("Expected simulate command");
        };
        let config = args.mock_config();
        assert_eq!(config.n_drops, None);
        assert_eq!(config.profile.gravity, 9.7);
        assert!(!config.auto_release);
        assert!(args.output.json);
        assert!(!args.output.plot);
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["freefall", "-v", "run", "--port", "/dev/ttyUSB0", "--plot"]);
        assert!(cli.verbose);
        let Commands::Run(args) = cli.command else {
            panic!("Expected run command");
        };
        assert_eq!(args.port, "/dev/ttyUSB0");
        assert!(args.output.plot);
    }

    #[test]
    fn test_run_requires_port_flag() {
        assert!(Cli::try_parse_from(["freefall", "run", "/dev/ttyUSB0"]).is_err());
    }
}
