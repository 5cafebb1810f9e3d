//! Snapshot shared between the poller and the processing tick.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::sensor::Reading;

/// A reading together with its publication number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub reading: Reading,
    /// Zero until the first publish, then incremented by each publish.
    pub version: u64,
}

/// Latest sensor reading, written whole by the poller and copied whole by
/// the tick, so depth, leak and timestamp always belong together.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SharedReading {
    inner: Arc<RwLock<Snapshot>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            reading: Reading::default(),
            version: 0,
        }
    }
}

impl SharedReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current reading. Returns the new version.
    pub fn publish(&self, reading: Reading) -> u64 {
        let mut slot = self.inner.write();
        slot.version += 1;
        slot.reading = reading;
        slot.version
    }

    /// Copy out the current reading.
    pub fn snapshot(&self) -> Snapshot {
        *self.inner.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_depth() {
        let shared = SharedReading::new();
        let snap = shared.snapshot();
        assert_eq!(snap.version, 0);
        assert!(!snap.reading.has_depth());
    }

    #[test]
    fn publish_bumps_version_and_is_visible_to_clones() {
        let shared = SharedReading::new();
        let reader = shared.clone();

        assert_eq!(shared.publish(Reading::new(12.0, 0, 1.0)), 1);
        assert_eq!(shared.publish(Reading::new(13.0, 4, 2.0)), 2);

        let snap = reader.snapshot();
        assert_eq!(snap.version, 2);
        assert_eq!(snap.reading, Reading::new(13.0, 4, 2.0));
    }

    #[test]
    fn concurrent_readers_never_see_torn_readings() {
        use std::thread;

        let shared = SharedReading::new();
        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 1..=2000 {
                    let v = i as f64;
                    // Every field derived from the same counter
                    shared.publish(Reading::new(v, i, v));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..2000 {
                        let snap = shared.snapshot();
                        if snap.version > 0 {
                            let r = snap.reading;
                            assert_eq!(r.depth_mm, r.timestamp);
                            assert_eq!(r.leak as f64, r.depth_mm);
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(shared.snapshot().version, 2000);
    }
}
