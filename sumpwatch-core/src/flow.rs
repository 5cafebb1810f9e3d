//! Flow-rate estimation from the volume series.
//!
//! The estimator smooths the volume series at two points `delta` samples
//! apart and divides the difference by the time between the window centres.
//! Positive flow means the level is rising (pump idle, water coming in);
//! zero or negative flow means the level is steady or the pump is draining.

use crate::kernel::GaussianSmoother;
use crate::series::TimeSeries;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Finite-difference flow estimator over a smoothed volume series.
#[derive(Debug, Clone)]
pub struct FlowEstimator {
    smoother: GaussianSmoother,
    delta: usize,
}

impl FlowEstimator {
    pub fn new(smoother: GaussianSmoother, delta: usize) -> Self {
        Self { smoother, delta }
    }

    /// Distance in samples between the two evaluation windows.
    pub fn delta(&self) -> usize {
        self.delta
    }

    /// Samples needed before an estimate is produced. The series must hold
    /// strictly more than this.
    pub fn min_history(&self) -> usize {
        self.smoother.window() + self.delta
    }

    /// Flow in volume units per hour, or 0 while history is too short.
    pub fn estimate(&self, volume: &TimeSeries) -> f64 {
        self.try_estimate(volume).unwrap_or(0.0)
    }

    /// Flow in volume units per hour.
    ///
    /// Returns `None` when the series holds `min_history()` samples or fewer,
    /// or when the window centres are not strictly ordered in time.
    pub fn try_estimate(&self, volume: &TimeSeries) -> Option<f64> {
        if volume.len() <= self.min_history() {
            return None;
        }

        let near = self.smoother.smooth(volume, 0)?;
        let far = self.smoother.smooth(volume, self.delta)?;

        let dt = self.smoother.center_time(volume, 0)?
            - self.smoother.center_time(volume, self.delta)?;
        if !(dt > 0.0) {
            return None;
        }

        let flow = (near - far) * SECONDS_PER_HOUR / dt;
        flow.is_finite().then_some(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Kernel;
    use crate::series::Sample;

    fn estimator(window: usize, sigma: f64, delta: usize) -> FlowEstimator {
        FlowEstimator::new(
            GaussianSmoother::new(Kernel::gaussian(window, sigma).unwrap()),
            delta,
        )
    }

    /// Volume ramp sampled every `step` seconds rising at `rate` per hour.
    fn ramp(count: usize, step: f64, rate: f64) -> TimeSeries {
        let mut series = TimeSeries::new("volume", 10_000);
        for i in 0..count {
            let t = 1_600_000_000.0 + i as f64 * step;
            let v = 20.0 + rate * (i as f64 * step) / SECONDS_PER_HOUR;
            series.append(Sample::new(t, v)).unwrap();
        }
        series
    }

    #[test]
    fn zero_until_history_exceeds_window_plus_delta() {
        for (window, delta) in [(127, 120), (29, 30), (5, 1)] {
            let est = estimator(window, window as f64 / 4.0, delta);
            let needed = window + delta;

            let series = ramp(needed, 1.0, 30.0);
            assert_eq!(est.estimate(&series), 0.0);
            assert!(est.try_estimate(&series).is_none());

            let series = ramp(needed + 1, 1.0, 30.0);
            assert!(est.try_estimate(&series).is_some());
        }
    }

    #[test]
    fn linear_ramp_converges_to_its_rate() {
        let est = estimator(127, 30.0, 120);
        for rate in [12.5, 30.0, -45.0] {
            let series = ramp(600, 1.0, rate);
            let flow = est.estimate(&series);
            assert!((flow - rate).abs() < 1e-6, "rate {rate} estimated as {flow}");
        }
    }

    #[test]
    fn faster_cadence_gives_the_same_rate() {
        let est = estimator(29, 7.0, 30);
        let series = ramp(200, 0.25, 18.0);
        assert!((est.estimate(&series) - 18.0).abs() < 1e-6);
    }

    #[test]
    fn rising_level_is_positive_and_falling_is_negative() {
        let est = estimator(5, 1.0, 3);
        assert!(est.estimate(&ramp(20, 1.0, 10.0)) > 0.0);
        assert!(est.estimate(&ramp(20, 1.0, -10.0)) < 0.0);
    }

    #[test]
    fn flat_series_has_zero_flow() {
        let est = estimator(5, 1.0, 3);
        let flow = est.estimate(&ramp(20, 1.0, 0.0));
        assert!(flow.abs() < 1e-9);
    }

    #[test]
    fn noise_is_suppressed() {
        let est = estimator(127, 30.0, 120);
        let mut series = TimeSeries::new("volume", 10_000);
        for i in 0..400 {
            // Deterministic +/-0.5 L jitter on a 24 L/h ramp
            let jitter = if i % 2 == 0 { 0.5 } else { -0.5 };
            let v = 20.0 + 24.0 * i as f64 / SECONDS_PER_HOUR + jitter;
            series.append(Sample::new(i as f64, v)).unwrap();
        }
        let flow = est.estimate(&series);
        assert!((flow - 24.0).abs() < 1.0, "estimated {flow}");
    }
}
