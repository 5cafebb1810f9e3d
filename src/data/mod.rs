//! Helpers for turning user input into values and values into display text.
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "250ms")

pub mod duration;
