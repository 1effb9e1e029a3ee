//! Command-line flags for the `lumen` binary

use crate::config::{
    SensorConfig, DEFAULT_HOST, DEFAULT_INTERVAL_MS, DEFAULT_KEEP_ALIVE_SECS, DEFAULT_PORT,
    DEFAULT_TOPIC,
};
use clap::Parser;
use std::time::Duration;

/// Simulated luminosity sensor publishing to an MQTT broker
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "lumen", version, about)]
pub struct Cli {
    /// Broker host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Broker port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Topic readings are published under
    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// Milliseconds between readings
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Stop after this many readings instead of running until Ctrl-C
    #[arg(long)]
    pub count: Option<u64>,

    /// MQTT client id (generated when omitted)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Seed for reproducible readings
    #[arg(long)]
    pub seed: Option<u64>,

    /// MQTT keep-alive in seconds
    #[arg(long, default_value_t = DEFAULT_KEEP_ALIVE_SECS)]
    pub keep_alive_secs: u64,
}

impl Cli {
    /// Sensor configuration described by these flags.
    pub fn into_config(self) -> SensorConfig {
        SensorConfig {
            broker_host: self.host,
            broker_port: self.port,
            topic: self.topic,
            interval: Duration::from_millis(self.interval_ms),
            client_id: self.client_id,
            keep_alive: Duration::from_secs(self.keep_alive_secs),
            max_readings: self.count,
            seed: self.seed,
            ..Default::default()
        }
    }
}
