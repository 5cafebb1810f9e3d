//! Error types for the sump pipeline.

use thiserror::Error;

/// Errors raised while building or feeding the pipeline.
///
/// Normal boundary conditions (not enough history, no depth reading yet,
/// a pump cycle too short to average) are not errors and never show up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A smoothing kernel could not be built.
    #[error("invalid kernel: {0}")]
    Kernel(String),

    /// A sample was appended out of time order.
    #[error("series '{series}': timestamp {timestamp} is not after newest sample at {newest}")]
    NonMonotonic {
        series: String,
        timestamp: f64,
        newest: f64,
    },

    /// The sensor could not produce a reading.
    #[error("sensor read failed: {0}")]
    Sensor(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;
