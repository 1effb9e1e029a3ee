//! Transport seam between the sensor loop and the broker client

use crate::{config::SensorConfig, error::Result};
use std::future::Future;

/// Something that can hand a payload to a broker.
///
/// `publish` returns as soon as the client has accepted or refused the
/// message. `Ok` means the message was queued for sending, not that a
/// subscriber (or even the broker) received it.
#[cfg_attr(test, mockall::automock)]
pub trait Publisher {
    /// Submit `payload` under `topic`.
    fn publish(&mut self, topic: &str, payload: &str) -> Result<()>;
}

/// Opens the single broker connection the loop publishes over.
pub trait Connector {
    /// Publisher handed to the loop once connected
    type Publisher: Publisher;

    /// Establish the connection described by `config`.
    fn connect(&self, config: &SensorConfig) -> impl Future<Output = Result<Self::Publisher>>;

    /// Called once after the loop ends. Resolves when everything the
    /// publisher accepted has been handed to the network.
    fn finish(&self, publisher: Self::Publisher) -> impl Future<Output = ()> {
        drop(publisher);
        async {}
    }
}
