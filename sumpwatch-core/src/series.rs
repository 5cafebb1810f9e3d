//! Bounded time series with FIFO eviction.

use std::collections::VecDeque;

use crate::error::{CoreError, Result};

/// One timestamped value.
///
/// Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// A named, append-only series holding at most `capacity` samples.
///
/// Samples are kept in time order and timestamps must strictly increase.
/// Once the series is full the oldest samples are dropped first.
///
/// ```
/// use sumpwatch_core::{Sample, TimeSeries};
///
/// let mut series = TimeSeries::new("depth", 2);
/// series.append(Sample::new(1.0, 10.0)).unwrap();
/// series.append(Sample::new(2.0, 11.0)).unwrap();
/// series.append(Sample::new(3.0, 12.0)).unwrap();
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.latest().unwrap().value, 12.0);
/// ```
#[derive(Debug, Clone)]
pub struct TimeSeries {
    name: String,
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl TimeSeries {
    /// Create an empty series. A capacity of zero is treated as one.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a sample, then evict down to capacity.
    ///
    /// Fails without modifying the series if `sample.time` is not after the
    /// newest sample's time.
    pub fn append(&mut self, sample: Sample) -> Result<()> {
        if let Some(newest) = self.samples.back() {
            if !(sample.time > newest.time) {
                return Err(CoreError::NonMonotonic {
                    series: self.name.clone(),
                    timestamp: sample.time,
                    newest: newest.time,
                });
            }
        }
        self.samples.push_back(sample);
        self.evict_to_capacity();
        Ok(())
    }

    /// Drop samples from the front until the series fits its capacity.
    ///
    /// Returns the number of samples removed.
    pub fn evict_to_capacity(&mut self) -> usize {
        let excess = self.samples.len().saturating_sub(self.capacity);
        self.samples.drain(..excess);
        excess
    }

    /// Newest sample, if any.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Sample `offset` positions before the newest (0 = newest).
    pub fn from_newest(&self, offset: usize) -> Option<&Sample> {
        let len = self.samples.len();
        if offset >= len {
            return None;
        }
        self.samples.get(len - 1 - offset)
    }

    /// Up to `n` most recent samples, newest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter().rev().take(n)
    }

    /// All samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// Minimum and maximum value, or `None` when empty.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.samples.iter().fold(None, |acc, s| match acc {
            None => Some((s.value, s.value)),
            Some((lo, hi)) => Some((lo.min(s.value), hi.max(s.value))),
        })
    }
}
