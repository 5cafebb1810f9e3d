//! # sumpwatch-adapters
//!
//! Concrete sensor sources and alarm sinks for the sumpwatch pipeline.
//!
//! ## Supported Backends
//!
//! - **Scripts** (`script` feature) - Runs external commands that print raw
//!   ADC codes, and starts alarm on/off commands in the background
//! - **Simulation** (`sim` feature) - A modelled sump with a float-switch
//!   pump, for demos and for trying settings without hardware
//!
//! ## Quick Start (simulation)
//!
//! ```rust,no_run
//! use sumpwatch_adapters::sim::{SimConfig, SimulatedSump};
//! use sumpwatch_core::{Calibration, Poller, SharedReading};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sump = SimulatedSump::new(SimConfig::default(), Calibration::default());
//!     let shared = SharedReading::new();
//!     let handle = Poller::builder(Box::new(sump)).build().start(shared.clone());
//!
//!     // ... tick a Monitor from shared.snapshot() ...
//!
//!     handle.shutdown().await;
//! }
//! ```

pub mod error;

#[cfg(feature = "script")]
pub mod script;

#[cfg(feature = "sim")]
pub mod sim;

pub use error::AdapterError;
