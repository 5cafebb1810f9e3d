//! # sumpwatch-core
//!
//! Signal pipeline for a sump pump monitor.
//!
//! Depth readings become volume, the volume series is smoothed with a
//! Gaussian kernel and differentiated into a flow rate, positive-flow runs
//! are grouped into pump cycles with one trimmed-mean inflow figure each, and
//! an edge-triggered latch drives the leak alarm.
//!
//! ## Quick Start
//!
//! ```rust
//! use sumpwatch_core::{Monitor, MonitorConfig, NullAlarm, Reading};
//!
//! let config = MonitorConfig {
//!     trend_export_path: None,
//!     ..Default::default()
//! };
//! let mut monitor = Monitor::new(config, Box::new(NullAlarm)).unwrap();
//!
//! let outcome = monitor.tick(Reading::new(120.0, 0, 1_700_000_000.0));
//! let values = outcome.values().unwrap();
//! assert_eq!(values.flow, 0.0); // not enough history yet
//! ```
//!
//! Sensor access runs separately: a [`Poller`] reads a [`SensorSource`] on
//! its own cadence and publishes into a [`SharedReading`], which the
//! processing loop copies from once per tick.

mod alarm;
mod config;
mod cycle;
mod error;
mod export;
mod flow;
mod kernel;
mod monitor;
mod poller;
mod sensor;
mod series;
mod state;

pub use alarm::{AlarmAction, AlarmController, AlarmEdge, AlarmSink, NullAlarm, RecordingAlarm};
pub use config::{
    Calibration, KernelConfig, KernelParams, KernelShape, MonitorConfig,
    DEFAULT_LEAK_THRESHOLD, DEFAULT_MAX_SERIES_POINTS,
};
pub use cycle::{trimmed_mean, CycleEvent, CycleSummary, PumpCycleAggregator, PumpState};
pub use error::{CoreError, Result};
pub use export::TrendExport;
pub use flow::FlowEstimator;
pub use kernel::{GaussianSmoother, Kernel};
pub use monitor::{Monitor, SkipReason, TickOutcome, TickStatus, TickValues};
pub use poller::{Poller, PollerBuilder, PollerHandle};
pub use sensor::{Reading, ScriptedSensor, SensorSource, NO_DEPTH};
pub use series::{Sample, TimeSeries};
pub use state::{SharedReading, Snapshot};
