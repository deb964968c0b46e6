//! Receive loop driving a [`TelemetryBridge`] from a [`DatagramSource`].
//!
//! Datagram handling and status logging share one task, so the bridge is
//! never touched from two places at once.

use std::future::Future;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::TelemetryBridge;
use crate::config::Config;
use crate::error::Result;
use crate::transport::{strip_transport_header, DatagramSource};

/// Run until `shutdown` resolves or the source closes
///
/// Transport errors are logged and the loop keeps receiving.
pub async fn run<S, F>(source: &mut S, bridge: &mut TelemetryBridge, config: &Config, shutdown: F) -> Result<()>
where
    S: DatagramSource + ?Sized,
    F: Future<Output = ()>,
{
    let header_len = config.transport.header_len;
    let mut status = interval(Duration::from_millis(config.logging.status_interval_ms));
    status.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("Bridge running (transport header {} bytes)", header_len);

    loop {
        tokio::select! {
            received = source.recv() => match received {
                Ok(Some(datagram)) => match strip_transport_header(&datagram.data, header_len) {
                    Some(packet) => {
                        let _ = bridge.handle_packet(packet);
                    }
                    None => debug!(
                        "Dropped {} byte datagram from {}: no room for {} byte header",
                        datagram.data.len(),
                        datagram.source,
                        header_len
                    ),
                },
                Ok(None) => {
                    info!("Datagram source closed");
                    break;
                }
                Err(e) => warn!("Failed to receive datagram: {}", e),
            },

            _ = status.tick() => log_status(bridge, config.logging.snapshot_json),

            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    let stats = bridge.stats();
    info!(
        "Packets: {} decoded: {} dropped: {} unknown: {} crc errors: {}",
        stats.packets, stats.decoded, stats.dropped, stats.unknown, stats.crc_errors
    );
    Ok(())
}

fn log_status(bridge: &TelemetryBridge, snapshot_json: bool) {
    let snapshot = bridge.snapshot();
    let stats = bridge.stats();

    info!(
        "Packets: {} decoded: {} | mode: '{}' armed: {} | {:.1}V {:.1}A {}mAh | sats: {} gps_good: {}",
        stats.packets,
        stats.decoded,
        snapshot.flight_mode,
        snapshot.armed,
        snapshot.battery.volts,
        snapshot.battery.amps,
        snapshot.battery.consumed_mah,
        snapshot.gps.satellites,
        snapshot.status.gps_good
    );

    if snapshot_json {
        match serde_json::to_string(snapshot) {
            Ok(json) => info!("{}", json),
            Err(e) => warn!("Failed to serialize snapshot: {}", e),
        }
    }
}
