//! Application configuration.
//!
//! Settings come from an optional TOML file, then from `SUMPWATCH_*`
//! environment variables (nested keys joined with `__`, e.g.
//! `SUMPWATCH_MONITOR__LEAK_THRESHOLD=12`). Anything left unset keeps its
//! default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use sumpwatch_adapters::script::{
    DEFAULT_ALARM_OFF_COMMAND, DEFAULT_ALARM_ON_COMMAND, DEFAULT_DEPTH_COMMAND,
    DEFAULT_LEAK_COMMAND,
};
use sumpwatch_adapters::sim::SimConfig;
use sumpwatch_core::MonitorConfig;

/// Top-level settings for the HMI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub sensors: SensorSettings,
    pub alarm: AlarmSettings,
    pub sim: SimConfig,
    pub log: LogSettings,
}

/// External commands that read the sensors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub depth_command: String,
    pub leak_command: String,
    /// Per-read timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            depth_command: DEFAULT_DEPTH_COMMAND.to_string(),
            leak_command: DEFAULT_LEAK_COMMAND.to_string(),
            timeout_ms: 5000,
        }
    }
}

/// External commands that drive the alarm.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlarmSettings {
    /// When false the alarm is tracked and shown but no command runs.
    pub enabled: bool,
    pub on_command: String,
    pub off_command: String,
    /// Kill an alarm command after this many milliseconds. Unset lets the
    /// siren script run until it exits.
    pub timeout_ms: Option<u64>,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            on_command: DEFAULT_ALARM_ON_COMMAND.to_string(),
            off_command: DEFAULT_ALARM_OFF_COMMAND.to_string(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub file: PathBuf,
    /// `EnvFilter` directives, used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("sumpwatch.log"),
            filter: "sumpwatch=info,sumpwatch_core=info,sumpwatch_adapters=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path` (if given) layered under the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("SUMPWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.monitor.validate()?;
        config.sim.validate()?;
        Ok(config)
    }
}
