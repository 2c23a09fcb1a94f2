//! # BotWheel Teleop
//!
//! Drive a two-wheel ODrive robot base from the keyboard, touch screens,
//! gamepads and tilt, and watch its motor telemetry.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Parse the command line and load the TOML configuration
//!    - Set up logging (stdout, or daily rolling files)
//!    - Discover evdev input devices and start one reader per device
//!    - Start the WebSocket connection to the robot
//!
//! 2. **Main Loop**
//!    - Funnel input events, link events and poll ticks into the session
//!    - Log link status and telemetry every few seconds
//!
//! 3. **Shutdown**
//!    - Stop on Ctrl+C, log loop counters and drop the link
//!
//! Enter arms the robot (`drive`), C coasts, Space brakes. `[` `]` and `-` `=`
//! step the two gains once the robot has reported them.
//!
//! ```bash
//! botwheel-teleop --config botwheel.toml --address 192.168.1.20:8080
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use botwheel_teleop::config::{Config, LoggingConfig};
use botwheel_teleop::error::TeleopError;
use botwheel_teleop::input::device::InputDevice;
use botwheel_teleop::link::ws;
use botwheel_teleop::scheduler;
use botwheel_teleop::session::Session;

/// Config file used when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = "botwheel.toml";

/// Buffered input events between device readers and the scheduler
const INPUT_CHANNEL_CAPACITY: usize = 256;

/// File name prefix of rolling log files
const LOG_FILE_PREFIX: &str = "botwheel-teleop.log";

#[derive(Debug, Parser)]
#[command(name = "botwheel-teleop", version, about)]
struct Opts {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Robot WebSocket address (host:port or ws:// URL), overrides the config file
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    let mut config = Config::load_or_default(&opts.config)
        .with_context(|| format!("Failed to load {}", opts.config.display()))?;
    if let Some(address) = opts.address {
        config.link.address = address;
        config.validate().context("Invalid --address")?;
    }

    let _log_guard = init_logging(&config.logging)?;

    info!("BotWheel Teleop v{} starting...", env!("CARGO_PKG_VERSION"));

    let devices = match InputDevice::discover(&config.input) {
        Ok(devices) => devices,
        Err(TeleopError::DeviceNotFound) => {
            warn!("No input devices found, waiting for link events only");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    for device in devices {
        info!("Reading {:?} at {}", device.kind(), device.path().display());
        device.spawn_reader(input_tx.clone());
    }
    drop(input_tx);

    info!("Connecting to robot at {}", config.link.address);
    let transport = ws::connect(
        config.link.address.clone(),
        Duration::from_millis(config.link.connect_timeout_ms),
    );

    let mut session = Session::new(&config.input, transport.link);
    session.set_connecting();

    info!("Press Ctrl+C to exit");
    let stats = scheduler::run(
        &mut session,
        input_rx,
        transport.events,
        config.input.poll_rate_hz,
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
        },
    )
    .await;

    info!(
        "Handled {} input events, {} link events, {} ticks",
        stats.input_events, stats.link_events, stats.ticks
    );
    transport.task.abort();

    Ok(())
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the configured level. The returned guard must stay
/// alive for file logs to be flushed.
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log filter")?;

    match &logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}
