//! Background sensor polling.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::watch;
use tokio::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Calibration;
use crate::error::{CoreError, Result};
use crate::sensor::{Reading, SensorSource};
use crate::state::SharedReading;

/// Reads the sensors on a fixed cadence and publishes complete readings.
///
/// # Example
///
/// ```rust,no_run
/// use sumpwatch_core::{Poller, ScriptedSensor, SharedReading};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let shared = SharedReading::new();
///     let handle = Poller::builder(Box::new(ScriptedSensor::new([800], [0])))
///         .interval(Duration::from_millis(250))
///         .build()
///         .start(shared.clone());
///
///     tokio::time::sleep(Duration::from_secs(1)).await;
///     println!("latest: {:?}", shared.snapshot());
///     handle.stop();
/// }
/// ```
#[derive(Debug)]
pub struct Poller {
    source: Box<dyn SensorSource>,
    calibration: Calibration,
    interval: Duration,
}

impl Poller {
    pub fn builder(source: Box<dyn SensorSource>) -> PollerBuilder {
        PollerBuilder::new(source)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Take one reading: a burst of depth codes, a timestamp, then the leak
    /// code.
    pub async fn poll_once(&mut self) -> Result<Reading> {
        let samples = self.calibration.depth_samples.max(1);
        let mut codes = Vec::with_capacity(samples);
        for _ in 0..samples {
            codes.push(self.source.read_depth_code().await?);
        }
        let depth_mm = self
            .calibration
            .depth_from_codes(&codes)
            .ok_or_else(|| CoreError::Sensor("no depth codes read".to_string()))?;
        let timestamp = unix_now();
        let leak = self.source.read_leak_code().await?;

        Ok(Reading::new(depth_mm, leak, timestamp))
    }

    /// Spawn the polling loop on the current tokio runtime.
    ///
    /// A failed poll is logged and leaves the previous reading in place.
    pub fn start(mut self, shared: SharedReading) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(self.interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut warned_slow = false;

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let started = Instant::now();
                        let result = self.poll_once().await;
                        let took = started.elapsed();
                        if took > self.interval && !warned_slow {
                            warned_slow = true;
                            warn!(
                                ?took,
                                interval = ?self.interval,
                                "Sensor poll overran its interval; readings arrive slower than configured"
                            );
                        }
                        match result {
                            Ok(reading) => {
                                let version = shared.publish(reading);
                                debug!(version, depth = reading.depth_mm, leak = reading.leak, "Published reading");
                            }
                            Err(e) => warn!(source = self.source.description(), "Sensor poll failed: {e}"),
                        }
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Poller stopped");
        });

        PollerHandle { stop_tx, task }
    }
}

/// Builder for a [`Poller`].
#[derive(Debug)]
pub struct PollerBuilder {
    source: Box<dyn SensorSource>,
    calibration: Option<Calibration>,
    interval: Option<Duration>,
}

impl PollerBuilder {
    pub fn new(source: Box<dyn SensorSource>) -> Self {
        Self {
            source,
            calibration: None,
            interval: None,
        }
    }

    /// Depth calibration. Defaults to [`Calibration::default`].
    pub fn calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Poll period. Defaults to 250 ms.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn build(self) -> Poller {
        Poller {
            source: self.source,
            calibration: self.calibration.unwrap_or_default(),
            interval: self.interval.unwrap_or(Duration::from_millis(250)),
        }
    }
}

/// Handle for stopping a running poller.
#[derive(Debug)]
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Signal the loop to exit after its current poll.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Signal the loop to exit and wait for it.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
