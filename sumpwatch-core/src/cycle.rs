//! Pump cycle classification and per-cycle flow averaging.
//!
//! While the pump is idle water leaks in and the estimated flow is positive.
//! Those flow values are collected, and when the flow turns non-positive
//! again (the pump kicked in) the run is reduced to one trimmed-mean figure.

use tracing::info;

/// Whether the pump is currently draining the sump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpState {
    /// Level steady or falling.
    #[default]
    Running,
    /// Level rising; inflow is being measured.
    Stopped,
}

impl PumpState {
    pub fn label(&self) -> &'static str {
        match self {
            PumpState::Running => "running",
            PumpState::Stopped => "stopped",
        }
    }
}

/// Summary of one completed pump cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    /// Timestamp of the tick that ended the cycle.
    pub ended_at: f64,
    /// Number of positive flow samples collected.
    pub samples: usize,
    /// Trimmed-mean inflow, or `None` if the cycle was too short to trim.
    pub average: Option<f64>,
}

/// What a single flow observation did to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleEvent {
    /// Flow is non-positive and no cycle is open.
    Idle,
    /// Flow turned positive: the pump just stopped.
    PumpStopped,
    /// Flow is still positive; the sample was recorded.
    Accumulating,
    /// Flow turned non-positive after a positive run: the pump just started.
    PumpStarted(CycleSummary),
}

/// Two-state classifier that averages inflow over each idle interval.
#[derive(Debug, Clone)]
pub struct PumpCycleAggregator {
    margin: usize,
    samples: Vec<f64>,
}

impl PumpCycleAggregator {
    /// `margin` samples are discarded from each end of a cycle before
    /// averaging.
    pub fn new(margin: usize) -> Self {
        Self {
            margin,
            samples: Vec::new(),
        }
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    pub fn state(&self) -> PumpState {
        if self.samples.is_empty() {
            PumpState::Running
        } else {
            PumpState::Stopped
        }
    }

    /// Flow samples collected in the open cycle.
    pub fn pending_samples(&self) -> usize {
        self.samples.len()
    }

    /// Feed one flow estimate taken at `timestamp`.
    pub fn observe(&mut self, timestamp: f64, flow: f64) -> CycleEvent {
        if flow > 0.0 {
            let was_empty = self.samples.is_empty();
            self.samples.push(flow);
            if was_empty {
                info!(flow, "Pump stopped");
                return CycleEvent::PumpStopped;
            }
            return CycleEvent::Accumulating;
        }

        if self.samples.is_empty() {
            return CycleEvent::Idle;
        }

        let average = trimmed_mean(&self.samples, self.margin);
        let summary = CycleSummary {
            ended_at: timestamp,
            samples: self.samples.len(),
            average,
        };
        self.samples.clear();

        match average {
            Some(avg) => info!(samples = summary.samples, "Pump started, average inflow {avg:.3}"),
            None => info!(
                samples = summary.samples,
                margin = self.margin,
                "Pump started, cycle too short to average"
            ),
        }
        CycleEvent::PumpStarted(summary)
    }
}

/// Mean of `values` after dropping `margin` items from each end.
///
/// Returns `None` unless at least one value survives the trim, i.e. when
/// `values.len() < 2 * margin + 1`.
pub fn trimmed_mean(values: &[f64], margin: usize) -> Option<f64> {
    let end = values.len().checked_sub(margin)?;
    if end <= margin {
        return None;
    }
    let kept = &values[margin..end];
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_mean_drops_both_ends() {
        let values = [100.0, 1.0, 2.0, 3.0, 100.0];
        assert_eq!(trimmed_mean(&values, 1), Some(2.0));
        assert_eq!(trimmed_mean(&values, 0), Some(41.2));
    }

    #[test]
    fn trimmed_mean_needs_one_survivor() {
        assert_eq!(trimmed_mean(&[1.0, 2.0, 3.0], 1), Some(2.0));
        assert_eq!(trimmed_mean(&[1.0, 2.0], 1), None);
        assert_eq!(trimmed_mean(&[1.0], 1), None);
        assert_eq!(trimmed_mean(&[], 0), None);
    }

    #[test]
    fn starts_running_and_stays_idle_on_zero_flow() {
        let mut agg = PumpCycleAggregator::new(20);
        assert_eq!(agg.state(), PumpState::Running);
        for t in 0..10 {
            assert_eq!(agg.observe(t as f64, 0.0), CycleEvent::Idle);
        }
        assert_eq!(agg.state(), PumpState::Running);
    }

    #[test]
    fn positive_run_then_drain_emits_one_summary() {
        let margin = 20;
        for run in [2 * margin + 1, 60, 250] {
            let mut agg = PumpCycleAggregator::new(margin);
            let flows: Vec<f64> = (0..run).map(|i| 10.0 + i as f64).collect();

            let mut summaries = Vec::new();
            for (i, flow) in flows.iter().enumerate() {
                let event = agg.observe(i as f64, *flow);
                if i == 0 {
                    assert_eq!(event, CycleEvent::PumpStopped);
                } else {
                    assert_eq!(event, CycleEvent::Accumulating);
                }
            }
            assert_eq!(agg.state(), PumpState::Stopped);

            if let CycleEvent::PumpStarted(s) = agg.observe(run as f64, -5.0) {
                summaries.push(s);
            }
            // Further drain ticks do nothing
            assert_eq!(agg.observe(run as f64 + 1.0, -5.0), CycleEvent::Idle);

            assert_eq!(summaries.len(), 1);
            let summary = summaries[0];
            assert_eq!(summary.samples, run);
            assert_eq!(summary.ended_at, run as f64);

            let expected = trimmed_mean(&flows, margin).unwrap();
            assert!((summary.average.unwrap() - expected).abs() < 1e-9);
            assert_eq!(agg.state(), PumpState::Running);
        }
    }

    #[test]
    fn short_cycle_reports_no_average() {
        let mut agg = PumpCycleAggregator::new(20);
        for i in 0..40 {
            agg.observe(i as f64, 3.0);
        }
        match agg.observe(40.0, 0.0) {
            CycleEvent::PumpStarted(summary) => {
                assert_eq!(summary.samples, 40);
                assert_eq!(summary.average, None);
            }
            other => panic!("expected PumpStarted, got {other:?}"),
        }
        assert_eq!(agg.pending_samples(), 0);
    }

    #[test]
    fn zero_flow_ends_a_cycle() {
        let mut agg = PumpCycleAggregator::new(0);
        agg.observe(0.0, 1.0);
        assert!(matches!(agg.observe(1.0, 0.0), CycleEvent::PumpStarted(_)));
    }
}
