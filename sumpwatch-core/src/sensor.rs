//! Sensor readings and the source abstraction.

use std::collections::VecDeque;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::{CoreError, Result};

/// Depth reported before the first real measurement arrives.
pub const NO_DEPTH: f64 = -999.0;

/// One complete sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Water depth in millimetres. Negative means no measurement yet.
    pub depth_mm: f64,
    /// Raw leak sensor code.
    pub leak: i32,
    /// Seconds since the Unix epoch when the depth was taken.
    pub timestamp: f64,
}

impl Reading {
    pub fn new(depth_mm: f64, leak: i32, timestamp: f64) -> Self {
        Self {
            depth_mm,
            leak,
            timestamp,
        }
    }

    /// Whether this reading carries a usable depth.
    pub fn has_depth(&self) -> bool {
        self.depth_mm >= 0.0
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::new(NO_DEPTH, 0, 0.0)
    }
}

/// Source of raw sensor codes.
///
/// Implementations may block on slow hardware; they are only ever driven from
/// the poller task, never from the processing tick.
#[async_trait]
pub trait SensorSource: Send + Debug {
    /// One raw depth ADC code.
    async fn read_depth_code(&mut self) -> Result<i32>;

    /// One raw leak sensor code.
    async fn read_leak_code(&mut self) -> Result<i32>;

    /// Human-readable description for the status bar.
    fn description(&self) -> &str;
}

/// Source that replays fixed code sequences.
///
/// Once a sequence runs out its last value repeats. An empty sequence makes
/// the corresponding read fail.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    depth: VecDeque<i32>,
    leak: VecDeque<i32>,
}

impl ScriptedSensor {
    pub fn new(depth: impl IntoIterator<Item = i32>, leak: impl IntoIterator<Item = i32>) -> Self {
        Self {
            depth: depth.into_iter().collect(),
            leak: leak.into_iter().collect(),
        }
    }

    fn next(queue: &mut VecDeque<i32>, what: &str) -> Result<i32> {
        match queue.len() {
            0 => Err(CoreError::Sensor(format!("no scripted {what} codes"))),
            1 => Ok(queue[0]),
            _ => Ok(queue.pop_front().unwrap_or_default()),
        }
    }
}

#[async_trait]
impl SensorSource for ScriptedSensor {
    async fn read_depth_code(&mut self) -> Result<i32> {
        Self::next(&mut self.depth, "depth")
    }

    async fn read_leak_code(&mut self) -> Result<i32> {
        Self::next(&mut self.leak, "leak")
    }

    fn description(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reading_has_no_depth() {
        let reading = Reading::default();
        assert!(!reading.has_depth());
        assert_eq!(reading.depth_mm, NO_DEPTH);
        assert!(Reading::new(0.0, 0, 1.0).has_depth());
    }

    #[tokio::test]
    async fn scripted_sensor_replays_then_repeats_last() {
        let mut sensor = ScriptedSensor::new([1, 2, 3], [0]);
        assert_eq!(sensor.read_depth_code().await.unwrap(), 1);
        assert_eq!(sensor.read_depth_code().await.unwrap(), 2);
        assert_eq!(sensor.read_depth_code().await.unwrap(), 3);
        assert_eq!(sensor.read_depth_code().await.unwrap(), 3);
        assert_eq!(sensor.read_leak_code().await.unwrap(), 0);
        assert_eq!(sensor.read_leak_code().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn scripted_sensor_without_codes_fails() {
        let mut sensor = ScriptedSensor::new([], [5]);
        assert!(matches!(sensor.read_depth_code().await, Err(CoreError::Sensor(_))));
        assert_eq!(sensor.read_leak_code().await.unwrap(), 5);
    }
}
