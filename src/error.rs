use thiserror::Error;

/// Error type shared by every stage of the sensor.
#[derive(Error, Debug)]
pub enum SensorError {
    /// Establishing the broker connection failed. Fatal at startup.
    #[error("Failed to connect to MQTT broker at {host}:{port}: {reason}")]
    Connect {
        /// Broker host that was dialed
        host: String,
        /// Broker port that was dialed
        port: u16,
        /// Underlying cause reported by the client
        reason: String,
    },

    /// The client did not accept a message for delivery
    #[error("Failed to publish data: {0}")]
    Publish(String),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SensorError {
    /// Whether the error should terminate the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SensorError::Publish(_))
    }
}

/// Convenient alias over [`Result`] using [`SensorError`]
pub type Result<T> = std::result::Result<T, SensorError>;
