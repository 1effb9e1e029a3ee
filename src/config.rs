// src/config.rs - Sensor configuration

use crate::error::*;
use std::time::Duration;

/// Default broker host
pub const DEFAULT_HOST: &str = "localhost";
/// Default broker port (plaintext MQTT)
pub const DEFAULT_PORT: u16 = 1883;
/// Default publish topic
pub const DEFAULT_TOPIC: &str = "livingroom/luminosity";
/// Default pause between readings in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 5_000;
/// Default MQTT keep-alive in seconds
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 30;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// CONNECT carries keep-alive as a 16-bit count of seconds
const MAX_KEEP_ALIVE: Duration = Duration::from_secs(u16::MAX as u64);

// ============================================================================
// SENSOR CONFIGURATION
// ============================================================================

/// Everything the sensor loop and its transport need, passed in at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    /// Broker host name or address
    pub broker_host: String,

    /// Broker TCP port
    pub broker_port: u16,

    /// Topic every reading is published under
    pub topic: String,

    /// Pause between two readings
    pub interval: Duration,

    /// MQTT client identifier. `None` generates one at connect time.
    pub client_id: Option<String>,

    /// MQTT keep-alive
    pub keep_alive: Duration,

    /// Upper bound on waiting for CONNACK
    pub connect_timeout: Duration,

    /// Stop after this many readings. `None` runs until interrupted.
    pub max_readings: Option<u64>,

    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            broker_host: DEFAULT_HOST.to_string(),
            broker_port: DEFAULT_PORT,
            topic: DEFAULT_TOPIC.to_string(),
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            client_id: None,
            keep_alive: Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_readings: None,
            seed: None,
        }
    }
}

impl SensorConfig {
    /// Configuration pointing at `host:port` with every other field defaulted.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            broker_host: host.into(),
            broker_port: port,
            ..Default::default()
        }
    }

    /// Broker address as `host:port`
    pub fn broker_addr(&self) -> String {
        format!("{}:{}", self.broker_host, self.broker_port)
    }

    /// Reject values the loop or the MQTT client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.broker_host.trim().is_empty() {
            return Err(SensorError::Config("broker host must not be empty".into()));
        }
        if self.broker_port == 0 {
            return Err(SensorError::Config("broker port must not be 0".into()));
        }
        validate_topic(&self.topic)?;
        if self.interval.is_zero() {
            return Err(SensorError::Config("publish interval must be greater than zero".into()));
        }
        if self.keep_alive < Duration::from_secs(1) || self.keep_alive > MAX_KEEP_ALIVE {
            return Err(SensorError::Config(format!(
                "keep-alive must be between 1s and {}s, got {:?}",
                MAX_KEEP_ALIVE.as_secs(),
                self.keep_alive
            )));
        }
        if self.connect_timeout.is_zero() {
            return Err(SensorError::Config("connect timeout must be greater than zero".into()));
        }
        if self.max_readings == Some(0) {
            return Err(SensorError::Config("reading count must be at least 1".into()));
        }
        if let Some(id) = &self.client_id {
            if id.is_empty() || id.starts_with(' ') {
                return Err(SensorError::Config(format!("invalid client id '{}'", id)));
            }
        }
        Ok(())
    }
}

/// Publish topics must be non-empty and free of wildcards.
fn validate_topic(topic: &str) -> Result<()> {
    if topic.is_empty() {
        return Err(SensorError::Config("topic must not be empty".into()));
    }
    if let Some(c) = topic.chars().find(|c| matches!(c, '+' | '#' | '\0')) {
        return Err(SensorError::Config(format!(
            "topic '{}' contains invalid character {:?}",
            topic, c
        )));
    }
    Ok(())
}
