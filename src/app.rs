//! Application state and navigation logic.

use std::time::{Duration, Instant};

use sumpwatch_core::{AlarmEdge, Monitor, SharedReading, TickOutcome};
use tracing::debug;

use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Current values, pump and alarm state, cycle trend.
    Summary,
    Depth,
    Volume,
    Flow,
}

impl View {
    pub const ALL: [View; 4] = [View::Summary, View::Depth, View::Volume, View::Flow];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Summary => View::Depth,
            View::Depth => View::Volume,
            View::Volume => View::Flow,
            View::Flow => View::Summary,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Summary => View::Flow,
            View::Depth => View::Summary,
            View::Volume => View::Depth,
            View::Flow => View::Volume,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Summary => "Summary",
            View::Depth => "Depth",
            View::Volume => "Volume",
            View::Flow => "Flow",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Summary => 0,
            View::Depth => 1,
            View::Volume => 2,
            View::Flow => 3,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    monitor: Monitor,
    shared: SharedReading,
    source_description: String,
    last_version: u64,
    last_reading_at: Option<Instant>,
    pub last_outcome: Option<TickOutcome>,

    /// The alarm is latched but the operator muted it.
    pub silenced: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `shared`, with a theme matched to the
    /// terminal background.
    pub fn new(monitor: Monitor, shared: SharedReading, source_description: &str) -> Self {
        Self::with_theme(monitor, shared, source_description, Theme::auto_detect())
    }

    pub fn with_theme(
        monitor: Monitor,
        shared: SharedReading,
        source_description: &str,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Summary,
            show_help: false,
            monitor,
            shared,
            source_description: source_description.to_string(),
            last_version: 0,
            last_reading_at: None,
            last_outcome: None,
            silenced: false,
            theme,
            status_message: None,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// Time since the poller last published, if it ever has.
    pub fn reading_age(&self) -> Option<Duration> {
        self.last_reading_at.map(|t| t.elapsed())
    }

    /// Run one processing tick on the latest shared reading.
    pub fn tick(&mut self) -> TickOutcome {
        let snapshot = self.shared.snapshot();
        if snapshot.version != self.last_version {
            self.last_version = snapshot.version;
            self.last_reading_at = Some(Instant::now());
        }

        let outcome = self.monitor.tick(snapshot.reading);
        match outcome.alarm {
            Some(AlarmEdge::Raised) => {
                self.silenced = false;
                self.set_status_message("Leak detected!".to_string());
            }
            Some(AlarmEdge::Cleared) => {
                self.silenced = false;
                self.set_status_message("Leak cleared".to_string());
            }
            None => {}
        }
        if let Some(summary) = outcome.cycle() {
            match summary.average {
                Some(avg) => self.set_status_message(format!("Pump cycle: {avg:.1} L/h inflow")),
                None => debug!(samples = summary.samples, "Short pump cycle"),
            }
        }

        self.last_outcome = Some(outcome);
        outcome
    }

    /// Mute the alarm output until the next alarm edge.
    pub fn silence_alarm(&mut self) {
        self.monitor.silence_alarm();
        self.silenced = self.monitor.is_alarming();
        self.set_status_message("Alarm silenced".to_string());
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Close the help overlay, or return to the summary.
    pub fn go_back(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else {
            self.current_view = View::Summary;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
