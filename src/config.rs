//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::crsf::protocol::{CRSF_MAX_STAGED_PACKET_LEN, CRSF_MIN_PACKET_LEN};
use crate::error::{BridgeError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub crsf: CrsfConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Datagram transport configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Bytes stripped from the front of every datagram
    #[serde(default = "default_header_len")]
    pub header_len: usize,

    /// Only accept datagrams from this address when set
    #[serde(default)]
    pub allowed_sender: Option<SocketAddr>,

    #[serde(default = "default_max_datagram_len")]
    pub max_datagram_len: usize,
}

/// CRSF decoding configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CrsfConfig {
    #[serde(default = "default_ring_capacity")]
    pub ring_capacity: usize,

    /// Drop frames whose CRC8 does not match
    #[serde(default)]
    pub verify_crc: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,

    /// Write logs to a daily rolling file in this directory instead of stdout
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Also log the full snapshot as JSON at each status tick
    #[serde(default)]
    pub snapshot_json: bool,
}

// Default value functions
fn default_bind_addr() -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], 5005)) }
fn default_header_len() -> usize { crate::transport::DEFAULT_HEADER_LEN }
fn default_max_datagram_len() -> usize { 250 }

fn default_ring_capacity() -> usize { crate::ring_buffer::DEFAULT_RING_CAPACITY }

fn default_status_interval_ms() -> u64 { 1000 }

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            header_len: default_header_len(),
            allowed_sender: None,
            max_datagram_len: default_max_datagram_len(),
        }
    }
}

impl Default for CrsfConfig {
    fn default() -> Self {
        Self {
            ring_capacity: default_ring_capacity(),
            verify_crc: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: default_status_interval_ms(),
            log_dir: None,
            snapshot_json: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crsf_telemetry_bridge::config::Config;
    ///
    /// let config = Config::load("config/bridge.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.transport.header_len > 32 {
            return Err(invalid("header_len must be between 0 and 32"));
        }

        if self.transport.max_datagram_len < CRSF_MIN_PACKET_LEN || self.transport.max_datagram_len > 1500 {
            return Err(invalid("max_datagram_len must be between 4 and 1500"));
        }

        if self.transport.max_datagram_len < self.transport.header_len + CRSF_MIN_PACKET_LEN {
            return Err(invalid("max_datagram_len must leave room for header_len plus a 4 byte frame"));
        }

        if self.crsf.ring_capacity < CRSF_MAX_STAGED_PACKET_LEN || self.crsf.ring_capacity > 4096 {
            return Err(invalid(&format!(
                "ring_capacity must be between {} and 4096",
                CRSF_MAX_STAGED_PACKET_LEN
            )));
        }

        if self.logging.status_interval_ms == 0 || self.logging.status_interval_ms > 60000 {
            return Err(invalid("status_interval_ms must be between 1 and 60000"));
        }

        if matches!(&self.logging.log_dir, Some(dir) if dir.as_os_str().is_empty()) {
            return Err(invalid("log_dir cannot be empty when set"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> BridgeError {
    BridgeError::Config(toml::de::Error::custom(msg))
}
