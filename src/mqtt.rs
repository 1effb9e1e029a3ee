use crate::{
    config::SensorConfig,
    error::*,
    publisher::{Connector, Publisher},
};
use rand::Rng;
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Capacity of the client's outgoing request queue
const REQUEST_CAPACITY: usize = 10;

/// Upper bound on draining queued publishes at shutdown
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects to a plaintext MQTT broker with rumqttc.
#[derive(Debug, Clone, Copy, Default)]
pub struct MqttConnector;

impl Connector for MqttConnector {
    type Publisher = MqttPublisher;

    fn connect(&self, config: &SensorConfig) -> impl Future<Output = Result<MqttPublisher>> {
        MqttPublisher::connect(config)
    }

    fn finish(&self, publisher: MqttPublisher) -> impl Future<Output = ()> {
        publisher.finish()
    }
}

/// Publishes readings at QoS 0 over an established rumqttc connection.
pub struct MqttPublisher {
    client: AsyncClient,
    driver: JoinHandle<()>,
}

impl MqttPublisher {
    /// Open the connection and wait for the broker's CONNACK.
    ///
    /// Once connected, the event loop is driven by a spawned task until the
    /// first connection error. It is never restarted.
    pub async fn connect(config: &SensorConfig) -> Result<Self> {
        config.validate()?;

        let client_id = config.client_id.clone().unwrap_or_else(generate_client_id);
        debug!("Connecting to {} as '{}'", config.broker_addr(), client_id);

        let mut mqttoptions = MqttOptions::new(client_id, &config.broker_host, config.broker_port);
        mqttoptions.set_keep_alive(config.keep_alive);
        mqttoptions.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(mqttoptions, REQUEST_CAPACITY);

        let connect_error = |reason: String| SensorError::Connect {
            host: config.broker_host.clone(),
            port: config.broker_port,
            reason,
        };

        match timeout(config.connect_timeout, wait_for_connack(&mut eventloop)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(connect_error(e.to_string())),
            Err(_) => {
                return Err(connect_error(format!(
                    "no CONNACK within {:?}",
                    config.connect_timeout
                )))
            }
        }

        let driver = tokio::spawn(drive(eventloop));

        Ok(Self { client, driver })
    }

    /// Send DISCONNECT behind any queued publishes and wait until the event
    /// loop has written them out.
    pub async fn finish(self) {
        if let Err(e) = self.client.try_disconnect() {
            debug!("Connection already closed: {}", e);
        }
        if timeout(FLUSH_TIMEOUT, self.driver).await.is_err() {
            warn!("Queued messages not flushed within {:?}", FLUSH_TIMEOUT);
        }
    }
}

impl Publisher for MqttPublisher {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<()> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| SensorError::Publish(e.to_string()))
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> std::result::Result<(), ConnectionError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(ack)) = eventloop.poll().await? {
            debug!("CONNACK received: {:?}", ack.code);
            return Ok(());
        }
    }
}

/// Flush queued publishes and answer keep-alives until the connection drops
/// or DISCONNECT has been written.
async fn drive(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("Disconnected from broker");
                break;
            }
            Ok(event) => debug!("MQTT event: {:?}", event),
            Err(e) => {
                warn!("MQTT connection lost: {}", e);
                break;
            }
        }
    }
}

fn generate_client_id() -> String {
    format!("lumen-{:08x}", rand::thread_rng().gen::<u32>())
}
