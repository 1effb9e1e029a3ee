// src/sensor.rs
use crate::{
    config::SensorConfig,
    error::*,
    publisher::{Connector, Publisher},
    reading::Reading,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use tokio::time::sleep;
use tracing::{info, warn};

/// Counters accumulated over the lifetime of a [`SensorLoop`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Readings generated
    pub cycles: u64,
    /// Publishes accepted by the client
    pub published: u64,
    /// Publishes the client refused
    pub failed: u64,
}

/// Generate, publish and pace, one reading per cycle.
pub struct SensorLoop<P> {
    config: SensorConfig,
    publisher: P,
    rng: StdRng,
    stats: LoopStats,
}

impl<P: Publisher> SensorLoop<P> {
    /// Build a loop that publishes through `publisher`. The RNG honors
    /// `config.seed`.
    pub fn new(config: SensorConfig, publisher: P) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            publisher,
            rng,
            stats: LoopStats::default(),
        }
    }

    /// Configuration the loop was built with
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Counters so far
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Give back the publisher once the loop is done with it.
    pub fn into_publisher(self) -> P {
        self.publisher
    }

    /// One iteration without the pacing wait. A refused publish is only
    /// logged and counted.
    pub fn cycle(&mut self) -> Reading {
        let reading = Reading::generate(&mut self.rng);
        let payload = reading.payload();
        self.stats.cycles += 1;

        match self.publisher.publish(&self.config.topic, &payload) {
            Ok(()) => {
                self.stats.published += 1;
                info!(topic = %self.config.topic, "Published luminosity: {} lux", payload);
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!("{}", e);
            }
        }

        reading
    }

    /// Run cycles until `shutdown` resolves or `max_readings` is reached.
    ///
    /// `shutdown` is only observed between cycles, while waiting out the
    /// interval. A cycle that has started always completes.
    pub async fn run<F>(&mut self, shutdown: F) -> LoopStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Starting luminosity data transmission...");

        loop {
            self.cycle();

            if let Some(max) = self.config.max_readings {
                if self.stats.cycles >= max {
                    info!("Sent {} readings, stopping", max);
                    break;
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Transmission stopped by user");
                    break;
                }
                _ = sleep(self.config.interval) => {}
            }
        }

        info!(
            "Final stats: {} readings, {} published, {} failed",
            self.stats.cycles, self.stats.published, self.stats.failed
        );
        self.stats
    }
}

/// Connect once, then run the sensor loop over that connection.
///
/// A failed connection returns immediately and nothing is published. A
/// shutdown while connecting ends the run with empty stats. Before
/// returning, the connector flushes whatever the loop published.
pub async fn run<C, F>(config: SensorConfig, connector: C, shutdown: F) -> Result<LoopStats>
where
    C: Connector,
    F: Future<Output = ()>,
{
    config.validate()?;
    tokio::pin!(shutdown);

    let publisher = tokio::select! {
        biased;
        _ = &mut shutdown => {
            info!("Transmission stopped by user");
            return Ok(LoopStats::default());
        }
        connected = connector.connect(&config) => connected?,
    };
    info!("Connected to MQTT broker at {}", config.broker_addr());

    let mut sensor = SensorLoop::new(config, publisher);
    let stats = sensor.run(&mut shutdown).await;
    connector.finish(sensor.into_publisher()).await;
    Ok(stats)
}
