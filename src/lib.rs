//! LUMEN - simulated luminosity sensor
//!
//! Generates a uniformly distributed reading in [0, 1000] lux on a fixed
//! interval and publishes it as two-decimal text to a single MQTT topic at
//! QoS 0. One connection is opened at startup and reused for every publish.
//! A failed publish is logged and the loop carries on. A failed connection
//! ends the run before anything is published.
//!
//! # Feature Flags
//!
//! - `mqtt` (default): rumqttc-backed [`MqttConnector`]
//!
//! # Examples
//!
//! ```no_run
//! use lumen::{MqttConnector, SensorConfig};
//!
//! # async fn demo() -> lumen::Result<()> {
//! let config = SensorConfig::default();
//! let stats = lumen::run(config, MqttConnector, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await?;
//! println!("{} readings published", stats.published);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Error types shared across the crate
pub mod error;

/// Sensor configuration with defaults and validation
pub mod config;

pub mod reading;

pub mod publisher;

/// The generate, publish and pace loop
pub mod sensor;

pub mod cli;

/// MQTT transport built on rumqttc
#[cfg(feature = "mqtt")]
pub mod mqtt;

pub use config::SensorConfig;
pub use error::{Result, SensorError};
pub use publisher::{Connector, Publisher};
pub use reading::Reading;
pub use sensor::{run, LoopStats, SensorLoop};

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConnector, MqttPublisher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
