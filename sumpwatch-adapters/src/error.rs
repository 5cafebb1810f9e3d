//! Error types for adapters.

use sumpwatch_core::CoreError;
use thiserror::Error;

/// Errors that can occur while talking to sensor or alarm hardware.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The command line was empty or malformed.
    #[error("Invalid command: {0}")]
    Command(String),

    /// The process could not be started.
    #[error("Failed to run '{command}': {reason}")]
    Spawn { command: String, reason: String },

    /// The process ran but reported failure.
    #[error("'{command}' exited with {status}")]
    ExitStatus { command: String, status: String },

    /// Output did not contain a reading.
    #[error("Failed to parse output: {0}")]
    Parse(String),

    /// Adapter settings are out of range.
    #[error("Invalid adapter configuration: {0}")]
    Config(String),
}

impl From<AdapterError> for CoreError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Config(msg) => CoreError::Config(msg),
            other => CoreError::Sensor(other.to_string()),
        }
    }
}
