//! Pipeline configuration.
//!
//! Every tuning constant of the pipeline lives here and is handed to the
//! components at construction time. The smoothing kernel and the pump-cycle
//! margin are expressed in seconds and converted to sample counts from a
//! single `sample_rate_hz`, so changing the tick cadence keeps the filters
//! covering the same stretch of time.
//!
//! ```
//! use sumpwatch_core::MonitorConfig;
//!
//! let config = MonitorConfig::default();
//! let params = config.kernel_params().unwrap();
//! assert_eq!(params.window, 127);
//! assert_eq!(params.delta, 120);
//! assert_eq!(config.cycle_margin_samples(), 20);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default bound on every high-frequency series.
pub const DEFAULT_MAX_SERIES_POINTS: usize = 10_000;

/// Default leak sensor code above which the alarm is raised.
pub const DEFAULT_LEAK_THRESHOLD: i32 = 10;

/// Top-level configuration for a [`Monitor`](crate::Monitor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Processing ticks per second. Also the rate at which series grow.
    pub sample_rate_hz: f64,
    /// Sensor poll period in milliseconds, independent of the tick.
    pub poll_interval_ms: u64,
    /// Raw-code to depth/volume conversion.
    pub calibration: Calibration,
    /// Flow smoothing kernel.
    pub kernel: KernelConfig,
    /// Seconds trimmed from each end of a pump cycle before averaging.
    pub cycle_margin_secs: f64,
    /// Explicit margin in samples; overrides `cycle_margin_secs`.
    pub cycle_margin: Option<usize>,
    /// Capacity of the depth, volume, flow and trend series.
    pub max_series_points: usize,
    /// Leak codes strictly above this raise the alarm.
    pub leak_threshold: i32,
    /// File that receives the average flow of every completed pump cycle.
    pub trend_export_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1.0,
            poll_interval_ms: 250,
            calibration: Calibration::default(),
            kernel: KernelConfig::default(),
            cycle_margin_secs: 20.0,
            cycle_margin: None,
            max_series_points: DEFAULT_MAX_SERIES_POINTS,
            leak_threshold: DEFAULT_LEAK_THRESHOLD,
            trend_export_path: Some(PathBuf::from("avgflow.txt")),
        }
    }
}

impl MonitorConfig {
    /// Period of the processing tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.sample_rate_hz)
    }

    /// Period of the sensor poller.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Whether new readings arrive less often than the tick consumes them.
    /// Series then grow slower than `sample_rate_hz`, so the kernel and
    /// the cycle margin span more time than configured.
    pub fn polls_slower_than_tick(&self) -> bool {
        self.poll_interval() > self.tick_interval()
    }

    /// Trim margin for pump-cycle averages, in samples.
    pub fn cycle_margin_samples(&self) -> usize {
        self.cycle_margin
            .unwrap_or_else(|| (self.cycle_margin_secs * self.sample_rate_hz).round() as usize)
    }

    /// Resolve the kernel settings against the sample rate.
    pub fn kernel_params(&self) -> Result<KernelParams> {
        self.kernel.resolve(self.sample_rate_hz)
    }

    /// Check that the configuration can drive a monitor.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(CoreError::Config(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(CoreError::Config("poll_interval_ms must be non-zero".to_string()));
        }
        self.calibration.validate()?;

        let params = self.kernel_params()?;
        if self.max_series_points <= params.window + params.delta {
            return Err(CoreError::Config(format!(
                "max_series_points ({}) must exceed kernel window + delta ({})",
                self.max_series_points,
                params.window + params.delta
            )));
        }
        Ok(())
    }
}

/// Linear calibration of the depth sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// ADC code read with the probe at zero depth.
    pub depth_offset: i32,
    /// Millimetres of water per ADC step.
    pub mm_per_lsb: f64,
    /// Litres held per millimetre of depth.
    #[serde(alias = "ml_per_mm")]
    pub liters_per_mm: f64,
    /// Depth codes averaged into one reading.
    pub depth_samples: usize,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            depth_offset: 741,
            mm_per_lsb: 1.525,
            liters_per_mm: 0.135,
            depth_samples: 10,
        }
    }
}

impl Calibration {
    /// Convert a burst of raw depth codes into millimetres.
    ///
    /// The codes are offset-corrected and averaged; an average below zero
    /// reads as an empty sump. Returns `None` for an empty burst.
    pub fn depth_from_codes(&self, codes: &[i32]) -> Option<f64> {
        if codes.is_empty() {
            return None;
        }
        let offset = f64::from(self.depth_offset);
        let sum: f64 = codes.iter().map(|&c| f64::from(c) - offset).sum();
        let avg = sum / codes.len() as f64;
        if avg < 0.0 {
            return Some(0.0);
        }
        Some(avg * self.mm_per_lsb)
    }

    /// Volume of water in the sump for a given depth.
    pub fn volume_from_depth(&self, depth_mm: f64) -> f64 {
        depth_mm * self.liters_per_mm
    }

    fn validate(&self) -> Result<()> {
        if self.depth_samples == 0 {
            return Err(CoreError::Config("depth_samples must be at least 1".to_string()));
        }
        if !(self.mm_per_lsb.is_finite() && self.liters_per_mm.is_finite()) {
            return Err(CoreError::Config("calibration factors must be finite".to_string()));
        }
        Ok(())
    }
}

/// Smoothing kernel settings.
///
/// Spans are given in seconds. The `window`, `delta` and `sigma` fields, when
/// set, are taken as sample counts and bypass the conversion. A literal
/// `table` replaces the generated Gaussian entirely and fixes the window
/// length to the table length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub window_secs: f64,
    pub delta_secs: f64,
    pub sigma_secs: f64,
    pub window: Option<usize>,
    pub delta: Option<usize>,
    pub sigma: Option<f64>,
    pub table: Option<Vec<f64>>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            window_secs: 127.0,
            delta_secs: 120.0,
            sigma_secs: 30.0,
            window: None,
            delta: None,
            sigma: None,
            table: None,
        }
    }
}

/// How the kernel weights are produced.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelShape {
    /// Discretized Gaussian with the given standard deviation, in samples.
    Gaussian { sigma: f64 },
    /// Literal weights, normalized on construction.
    Table(Vec<f64>),
}

/// Kernel settings resolved to sample counts.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelParams {
    pub window: usize,
    pub delta: usize,
    pub shape: KernelShape,
}

impl KernelConfig {
    /// Resolve spans to sample counts at the given rate.
    ///
    /// A derived window is rounded up to the next odd length so that it has a
    /// centre sample.
    pub fn resolve(&self, sample_rate_hz: f64) -> Result<KernelParams> {
        let delta = self
            .delta
            .unwrap_or_else(|| (self.delta_secs * sample_rate_hz).round() as usize);
        if delta == 0 {
            return Err(CoreError::Config("kernel delta must be at least one sample".to_string()));
        }

        if let Some(table) = &self.table {
            return Ok(KernelParams {
                window: table.len(),
                delta,
                shape: KernelShape::Table(table.clone()),
            });
        }

        let window = match self.window {
            Some(w) => w,
            None => {
                let w = (self.window_secs * sample_rate_hz).round() as usize;
                if w % 2 == 0 {
                    w + 1
                } else {
                    w
                }
            }
        };
        let sigma = self.sigma.unwrap_or(self.sigma_secs * sample_rate_hz);

        Ok(KernelParams {
            window,
            delta,
            shape: KernelShape::Gaussian { sigma },
        })
    }
}
