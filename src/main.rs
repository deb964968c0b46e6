//! # CRSF Telemetry Bridge
//!
//! Decode CRSF telemetry relayed over an ESP-NOW backpack link into live
//! flight state.

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crsf_telemetry_bridge::bridge::{self, TelemetryBridge};
use crsf_telemetry_bridge::config::{Config, LoggingConfig};
use crsf_telemetry_bridge::transport::UdpDatagramSource;

/// Log file name prefix inside `logging.log_dir`
const LOG_FILE_PREFIX: &str = "crsf-telemetry-bridge.log";

/// Main entry point for the telemetry bridge
///
/// # Control Flow
///
/// 1. Load configuration from the path given as first argument, or defaults
/// 2. Set up logging (stdout, or a rolling file when `logging.log_dir` is set)
/// 3. Bind the UDP datagram source
/// 4. Decode telemetry until Ctrl+C
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/bridge.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO crsf_telemetry_bridge: CRSF Telemetry Bridge v0.1.0 starting...
/// INFO crsf_telemetry_bridge::transport::udp: Listening for telemetry datagrams on 0.0.0.0:5005
/// INFO crsf_telemetry_bridge::bridge::runner: Packets: 250 decoded: 248 | mode: 'ARM' armed: true | ...
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging);

    info!("CRSF Telemetry Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut source = UdpDatagramSource::bind(&config.transport).await?;
    let mut bridge = TelemetryBridge::new(&config.crsf);

    info!("Press Ctrl+C to exit");

    bridge::run(&mut source, &mut bridge, &config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    Ok(())
}

/// Install the tracing subscriber
///
/// The returned guard flushes the file writer on drop and must be kept alive.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

