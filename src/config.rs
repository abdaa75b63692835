//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{BridgeError, Result};
use crate::hoermann::protocol::{DEFAULT_RESPONSE_DELAY_TICKS, DEFAULT_STATUS_INTERVAL_TICKS};

/// Baud rates accepted on any link
const VALID_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

/// Log levels accepted by `logging.level`
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Role of this bridge
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Emulate a UAP1 on the operator bus, optionally serving a gateway link
    #[default]
    Bus,
    /// Talk to the operator (or a bus bridge) over the direct link
    Direct,
}

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub direct: DirectConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// RS-485 bus configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BusConfig {
    #[serde(default = "default_bus_port")]
    pub port: String,

    #[serde(default = "default_bus_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_response_delay_ticks")]
    pub response_delay_ticks: u16,

    /// Silence before a received chunk that counts as a line break
    #[serde(default = "default_break_gap_ms")]
    pub break_gap_ms: u64,

    #[serde(default = "default_break_duration_us")]
    pub break_duration_us: u64,
}

/// Gateway link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    #[serde(default = "default_gateway_port")]
    pub port: String,

    #[serde(default = "default_link_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_status_interval_ticks")]
    pub status_interval_ticks: u32,
}

/// Direct link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DirectConfig {
    #[serde(default = "default_direct_port")]
    pub port: String,

    #[serde(default = "default_link_baud_rate")]
    pub baud_rate: u32,
}

/// Tick configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily rolling log file; stderr only when unset
    #[serde(default)]
    pub directory: Option<String>,
}

// Default value functions
fn default_bus_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_bus_baud_rate() -> u32 { 19200 }
fn default_response_delay_ticks() -> u16 { DEFAULT_RESPONSE_DELAY_TICKS }
fn default_break_gap_ms() -> u64 { 2 }
fn default_break_duration_us() -> u64 { 1000 }

fn default_gateway_enabled() -> bool { true }
fn default_gateway_port() -> String { "/dev/ttyUSB1".to_string() }
fn default_status_interval_ticks() -> u32 { DEFAULT_STATUS_INTERVAL_TICKS }

fn default_direct_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_link_baud_rate() -> u32 { 9600 }

fn default_tick_ms() -> u64 { 1 }

fn default_log_level() -> String { "info".to_string() }

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            port: default_bus_port(),
            baud_rate: default_bus_baud_rate(),
            response_delay_ticks: default_response_delay_ticks(),
            break_gap_ms: default_break_gap_ms(),
            break_duration_us: default_break_duration_us(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            port: default_gateway_port(),
            baud_rate: default_link_baud_rate(),
            status_interval_ticks: default_status_interval_ticks(),
        }
    }
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            port: default_direct_port(),
            baud_rate: default_link_baud_rate(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { tick_ms: default_tick_ms() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            bus: BusConfig::default(),
            gateway: GatewayConfig::default(),
            direct: DirectConfig::default(),
            timing: TimingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> BridgeError {
    BridgeError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
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
    /// use hoermann_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
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
        // Only the ports of the active mode have to be usable
        match self.mode {
            Mode::Bus => {
                validate_port("bus.port", &self.bus.port)?;
                validate_baud_rate("bus.baud_rate", self.bus.baud_rate)?;
                if self.gateway.enabled {
                    validate_port("gateway.port", &self.gateway.port)?;
                    validate_baud_rate("gateway.baud_rate", self.gateway.baud_rate)?;
                    if self.gateway.port == self.bus.port {
                        return Err(invalid("gateway.port must differ from bus.port"));
                    }
                }
            }
            Mode::Direct => {
                validate_port("direct.port", &self.direct.port)?;
                validate_baud_rate("direct.baud_rate", self.direct.baud_rate)?;
            }
        }

        if self.timing.tick_ms == 0 || self.timing.tick_ms > 100 {
            return Err(invalid("tick_ms must be between 1 and 100"));
        }

        if self.bus.response_delay_ticks > 1000 {
            return Err(invalid("response_delay_ticks must be at most 1000"));
        }

        if self.bus.break_gap_ms == 0 || self.bus.break_gap_ms > 1000 {
            return Err(invalid("break_gap_ms must be between 1 and 1000"));
        }

        if self.bus.break_duration_us < 100 || self.bus.break_duration_us > 100_000 {
            return Err(invalid("break_duration_us must be between 100 and 100000"));
        }

        if self.gateway.status_interval_ticks == 0 || self.gateway.status_interval_ticks > 600_000 {
            return Err(invalid("status_interval_ticks must be between 1 and 600000"));
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        if matches!(&self.logging.directory, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging directory cannot be empty when set"));
        }

        Ok(())
    }
}

fn validate_port(name: &str, port: &str) -> Result<()> {
    if port.is_empty() {
        return Err(invalid(format!("{} cannot be empty", name)));
    }
    Ok(())
}

fn validate_baud_rate(name: &str, baud_rate: u32) -> Result<()> {
    if !VALID_BAUD_RATES.contains(&baud_rate) {
        return Err(invalid(format!(
            "{} must be one of: 9600, 19200, 38400, 57600, 115200",
            name
        )));
    }
    Ok(())
}
