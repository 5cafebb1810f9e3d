//! Leak alarm latch.
//!
//! The controller raises the alarm once when the leak reading crosses the
//! threshold and clears it once when the reading drops back. Silencing mutes
//! the external alarm without forgetting that the trouble condition is still
//! present.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

/// Receiver of alarm side effects.
///
/// Calls are fire-and-forget: implementations handle and log their own
/// failures and must not block the caller for long.
pub trait AlarmSink: Send + Debug {
    /// Sound the alarm.
    fn activate(&self);

    /// Stop the alarm.
    fn deactivate(&self);
}

/// A state change of the alarm latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEdge {
    Raised,
    Cleared,
}

/// Edge-triggered alarm driven by leak sensor readings.
#[derive(Debug)]
pub struct AlarmController {
    threshold: i32,
    alarming: bool,
    sink: Box<dyn AlarmSink>,
}

impl AlarmController {
    pub fn new(threshold: i32, sink: Box<dyn AlarmSink>) -> Self {
        Self {
            threshold,
            alarming: false,
            sink,
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Whether a leak is currently latched.
    pub fn is_alarming(&self) -> bool {
        self.alarming
    }

    /// Evaluate a leak reading and fire the sink on state edges only.
    pub fn on_leak_reading(&mut self, value: i32) -> Option<AlarmEdge> {
        if value > self.threshold {
            if self.alarming {
                return None;
            }
            self.alarming = true;
            warn!(value, threshold = self.threshold, "Leak detected, alarm on");
            self.sink.activate();
            Some(AlarmEdge::Raised)
        } else if self.alarming {
            self.alarming = false;
            info!(value, "Leak cleared, alarm off");
            self.sink.deactivate();
            Some(AlarmEdge::Cleared)
        } else {
            None
        }
    }

    /// Mute the external alarm. The latch is left as is.
    pub fn silence(&mut self) {
        info!(alarming = self.alarming, "Alarm silenced");
        self.sink.deactivate();
    }
}

/// A request made of an [`AlarmSink`], as recorded by [`RecordingAlarm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmAction {
    Activate,
    Deactivate,
}

/// Sink that only records the calls it receives.
///
/// Clones share the same log, so a clone kept by a test sees the calls made
/// through the boxed original.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlarm {
    actions: Arc<Mutex<Vec<AlarmAction>>>,
}

impl RecordingAlarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, in order.
    pub fn actions(&self) -> Vec<AlarmAction> {
        self.actions.lock().clone()
    }

    pub fn count(&self, action: AlarmAction) -> usize {
        self.actions.lock().iter().filter(|a| **a == action).count()
    }
}

impl AlarmSink for RecordingAlarm {
    fn activate(&self) {
        self.actions.lock().push(AlarmAction::Activate);
    }

    fn deactivate(&self) {
        self.actions.lock().push(AlarmAction::Deactivate);
    }
}

/// Sink that does nothing, for running without alarm hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAlarm;

impl AlarmSink for NullAlarm {
    fn activate(&self) {}

    fn deactivate(&self) {}
}
