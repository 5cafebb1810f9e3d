//! The processing tick: one reading in, updated series and events out.

use tracing::{debug, warn};

use crate::alarm::{AlarmController, AlarmEdge, AlarmSink};
use crate::config::MonitorConfig;
use crate::cycle::{CycleEvent, CycleSummary, PumpCycleAggregator, PumpState};
use crate::error::Result;
use crate::export::TrendExport;
use crate::flow::FlowEstimator;
use crate::kernel::{GaussianSmoother, Kernel};
use crate::sensor::Reading;
use crate::series::{Sample, TimeSeries};

/// Why a tick did not touch the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No depth measurement has arrived yet.
    NoDepth,
    /// The reading is not newer than the last one processed.
    StaleReading,
}

/// Values derived from one processed reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickValues {
    pub timestamp: f64,
    pub depth: f64,
    pub volume: f64,
    pub flow: f64,
    pub pump: PumpState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickStatus {
    Skipped(SkipReason),
    Processed {
        values: TickValues,
        /// Set on the tick that closed a pump cycle.
        cycle: Option<CycleSummary>,
    },
}

/// Result of [`Monitor::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Alarm edge fired by this tick's leak reading, if any.
    pub alarm: Option<AlarmEdge>,
    pub status: TickStatus,
}

impl TickOutcome {
    pub fn values(&self) -> Option<&TickValues> {
        match &self.status {
            TickStatus::Processed { values, .. } => Some(values),
            TickStatus::Skipped(_) => None,
        }
    }

    pub fn cycle(&self) -> Option<&CycleSummary> {
        match &self.status {
            TickStatus::Processed { cycle, .. } => cycle.as_ref(),
            TickStatus::Skipped(_) => None,
        }
    }
}

/// Owns every series and pipeline stage and advances them once per tick.
#[derive(Debug)]
pub struct Monitor {
    config: MonitorConfig,
    depth: TimeSeries,
    volume: TimeSeries,
    flow: TimeSeries,
    trend: TimeSeries,
    estimator: FlowEstimator,
    cycles: PumpCycleAggregator,
    alarm: AlarmController,
    export: Option<TrendExport>,
    last_values: Option<TickValues>,
}

impl Monitor {
    /// Build a monitor, validating the configuration and constructing the
    /// kernel up front.
    pub fn new(config: MonitorConfig, sink: Box<dyn AlarmSink>) -> Result<Self> {
        config.validate()?;
        let params = config.kernel_params()?;
        let kernel = Kernel::from_params(&params)?;
        let estimator = FlowEstimator::new(GaussianSmoother::new(kernel), params.delta);
        let cycles = PumpCycleAggregator::new(config.cycle_margin_samples());
        let cap = config.max_series_points;

        debug!(
            window = params.window,
            delta = estimator.delta(),
            first_estimate_after = estimator.min_history() + 1,
            margin = cycles.margin(),
            capacity = cap,
            "Monitor configured"
        );
        if config.polls_slower_than_tick() {
            warn!(
                poll = ?config.poll_interval(),
                tick = ?config.tick_interval(),
                "Sensor poll is slower than the tick; smoothing will span more time than configured"
            );
        }

        Ok(Self {
            depth: TimeSeries::new("depth", cap),
            volume: TimeSeries::new("volume", cap),
            flow: TimeSeries::new("flow", cap),
            trend: TimeSeries::new("trend", cap),
            estimator,
            cycles,
            alarm: AlarmController::new(config.leak_threshold, sink),
            export: config.trend_export_path.clone().map(TrendExport::new),
            last_values: None,
            config,
        })
    }

    /// Process one reading.
    pub fn tick(&mut self, reading: Reading) -> TickOutcome {
        let alarm = self.alarm.on_leak_reading(reading.leak);

        if !reading.has_depth() {
            return TickOutcome {
                alarm,
                status: TickStatus::Skipped(SkipReason::NoDepth),
            };
        }

        let t = reading.timestamp;
        let depth = reading.depth_mm;
        let volume = self.config.calibration.volume_from_depth(depth);

        if let Err(e) = self.depth.append(Sample::new(t, depth)) {
            debug!("Skipping reading: {e}");
            return TickOutcome {
                alarm,
                status: TickStatus::Skipped(SkipReason::StaleReading),
            };
        }
        push(&mut self.volume, t, volume);

        let flow = self.estimator.estimate(&self.volume);
        push(&mut self.flow, t, flow);

        let cycle = match self.cycles.observe(t, flow) {
            CycleEvent::PumpStarted(summary) => {
                if let Some(avg) = summary.average {
                    self.record_trend(t, avg);
                }
                Some(summary)
            }
            _ => None,
        };

        let values = TickValues {
            timestamp: t,
            depth,
            volume,
            flow,
            pump: self.cycles.state(),
        };
        self.last_values = Some(values);

        TickOutcome {
            alarm,
            status: TickStatus::Processed { values, cycle },
        }
    }

    fn record_trend(&mut self, t: f64, avg: f64) {
        push(&mut self.trend, t, avg);
        if let Some(export) = &self.export {
            if let Err(e) = export.write(avg) {
                warn!(path = %export.path().display(), "Failed to write trend export: {e}");
            }
        }
    }

    /// Mute the external alarm without clearing the latch.
    pub fn silence_alarm(&mut self) {
        self.alarm.silence();
    }

    pub fn is_alarming(&self) -> bool {
        self.alarm.is_alarming()
    }

    pub fn pump_state(&self) -> PumpState {
        self.cycles.state()
    }

    /// Values from the last processed tick.
    pub fn last_values(&self) -> Option<&TickValues> {
        self.last_values.as_ref()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn depth_series(&self) -> &TimeSeries {
        &self.depth
    }

    pub fn volume_series(&self) -> &TimeSeries {
        &self.volume
    }

    pub fn flow_series(&self) -> &TimeSeries {
        &self.flow
    }

    /// One point per completed pump cycle: its trimmed-mean inflow.
    pub fn trend_series(&self) -> &TimeSeries {
        &self.trend
    }
}

// Timestamps were already checked against the depth series, which every
// other series trails.
fn push(series: &mut TimeSeries, t: f64, value: f64) {
    if let Err(e) = series.append(Sample::new(t, value)) {
        warn!("Dropped sample: {e}");
    }
}
