//! # sumpwatch
//!
//! A terminal HMI for a sump pump: live water depth, sump volume, inflow
//! rate and the per-cycle inflow trend, with a leak alarm that can be
//! silenced from the keyboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         Application                           │
//! │  ┌─────────┐    ┌──────────────┐    ┌─────────┐    ┌────────┐ │
//! │  │ Poller  │───▶│ SharedReading│───▶│   app   │───▶│   ui   │ │
//! │  │ (tokio) │    │  (snapshot)  │    │ Monitor │    │ratatui │ │
//! │  └────┬────┘    └──────────────┘    └─────────┘    └────────┘ │
//! │       │                                                       │
//! │       ▼                                                       │
//! │  ScriptSensor | SimulatedSump                                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation and the processing tick
//! - **[`config`]**: Layered configuration (file, then `SUMPWATCH_*` env vars)
//! - **[`data`]**: Duration parsing and formatting helpers
//! - **[`events`]**: Keyboard and mouse handling
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! The signal pipeline itself lives in `sumpwatch-core`; sensor and alarm
//! backends live in `sumpwatch-adapters`.
//!
//! ## Usage
//!
//! ```bash
//! # Run against the sensor scripts in the current directory
//! sumpwatch
//!
//! # Run against a simulated sump at ten times real speed
//! sumpwatch --simulate --speed 10
//! ```
//!
//! ### As a library
//!
//! ```
//! use sumpwatch::{App, Theme};
//! use sumpwatch_core::{Monitor, MonitorConfig, NullAlarm, Reading, SharedReading};
//!
//! let config = MonitorConfig {
//!     trend_export_path: None,
//!     ..Default::default()
//! };
//! let monitor = Monitor::new(config, Box::new(NullAlarm)).unwrap();
//! let shared = SharedReading::new();
//! let mut app = App::with_theme(monitor, shared.clone(), "example", Theme::dark());
//!
//! shared.publish(Reading::new(150.0, 0, 1_700_000_000.0));
//! app.tick();
//! assert!(app.monitor().last_values().is_some());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::{AlarmSettings, AppConfig, LogSettings, SensorSettings};
pub use ui::Theme;
