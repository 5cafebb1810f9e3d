//! Simulated sump for running without hardware.
//!
//! Water flows in at a constant rate until the level reaches the pump's
//! switch-on height, then the pump drains it down to the switch-off height.
//! Depth codes carry a little ADC noise, and an optional leak episode can be
//! injected at random.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tokio::time::Instant;

use async_trait::async_trait;
use sumpwatch_core::{Calibration, SensorSource};

use crate::AdapterError;

/// Parameters of the simulated sump.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Level at start, mm.
    pub start_mm: f64,
    /// Rise rate while the pump is off, mm/s.
    pub inflow_mm_per_s: f64,
    /// Net fall rate while the pump runs, mm/s.
    pub drain_mm_per_s: f64,
    /// Pump switches on at this level.
    pub pump_on_mm: f64,
    /// Pump switches off at this level.
    pub pump_off_mm: f64,
    /// Simulated seconds per real second.
    pub time_scale: f64,
    /// Peak ADC noise, in codes.
    pub noise_codes: i32,
    /// Chance per leak read of starting a leak episode.
    pub leak_chance: f64,
    /// Leak reads an episode lasts.
    pub leak_reads: u32,
    /// Leak code reported during an episode.
    pub leak_code: i32,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_mm: 130.0,
            inflow_mm_per_s: 0.08,
            drain_mm_per_s: 1.5,
            pump_on_mm: 200.0,
            pump_off_mm: 110.0,
            time_scale: 1.0,
            noise_codes: 1,
            leak_chance: 0.0,
            leak_reads: 40,
            leak_code: 40,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Reject settings the model cannot run with.
    pub fn validate(&self) -> Result<(), AdapterError> {
        let rates = [
            ("start_mm", self.start_mm),
            ("inflow_mm_per_s", self.inflow_mm_per_s),
            ("drain_mm_per_s", self.drain_mm_per_s),
            ("pump_on_mm", self.pump_on_mm),
            ("pump_off_mm", self.pump_off_mm),
            ("time_scale", self.time_scale),
        ];
        if let Some((name, _)) = rates.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AdapterError::Config(format!("sim.{name} must be finite")));
        }
        if !(0.0..=1.0).contains(&self.leak_chance) {
            return Err(AdapterError::Config(format!(
                "sim.leak_chance must be within 0..=1, got {}",
                self.leak_chance
            )));
        }
        if self.time_scale <= 0.0 {
            return Err(AdapterError::Config("sim.time_scale must be positive".to_string()));
        }
        if self.pump_off_mm >= self.pump_on_mm {
            return Err(AdapterError::Config(
                "sim.pump_off_mm must be below sim.pump_on_mm".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sensor source backed by a simple sump model.
#[derive(Debug)]
pub struct SimulatedSump {
    config: SimConfig,
    calibration: Calibration,
    level_mm: f64,
    pumping: bool,
    leak_left: u32,
    last_update: Instant,
    rng: StdRng,
}

impl SimulatedSump {
    /// The calibration is used in reverse to turn the modelled level into
    /// raw codes.
    pub fn new(config: SimConfig, calibration: Calibration) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            level_mm: config.start_mm,
            pumping: false,
            leak_left: 0,
            last_update: Instant::now(),
            rng,
            calibration,
            config,
        }
    }

    pub fn level_mm(&self) -> f64 {
        self.level_mm
    }

    pub fn is_pumping(&self) -> bool {
        self.pumping
    }

    /// Advance the model by `secs` simulated seconds.
    pub fn step(&mut self, secs: f64) {
        if self.pumping {
            self.level_mm -= self.config.drain_mm_per_s * secs;
            if self.level_mm <= self.config.pump_off_mm {
                self.pumping = false;
            }
        } else {
            self.level_mm += self.config.inflow_mm_per_s * secs;
            if self.level_mm >= self.config.pump_on_mm {
                self.pumping = true;
            }
        }
        self.level_mm = self.level_mm.max(0.0);
    }

    fn catch_up(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        self.step(elapsed * self.config.time_scale);
    }

    fn depth_code(&mut self) -> i32 {
        let steps = (self.level_mm / self.calibration.mm_per_lsb).round() as i32;
        let noise = match self.config.noise_codes {
            n if n > 0 => self.rng.gen_range(-n..=n),
            _ => 0,
        };
        self.calibration.depth_offset + steps + noise
    }

    fn leak_code(&mut self) -> i32 {
        // NaN compares false and never starts an episode
        let chance = self.config.leak_chance;
        let chance = if chance > 0.0 { chance.min(1.0) } else { 0.0 };
        if self.leak_left == 0 && self.rng.gen_bool(chance) {
            self.leak_left = self.config.leak_reads;
        }
        if self.leak_left > 0 {
            self.leak_left -= 1;
            return self.config.leak_code;
        }
        self.rng.gen_range(0..=2)
    }
}

#[async_trait]
impl SensorSource for SimulatedSump {
    async fn read_depth_code(&mut self) -> sumpwatch_core::Result<i32> {
        self.catch_up();
        Ok(self.depth_code())
    }

    async fn read_leak_code(&mut self) -> sumpwatch_core::Result<i32> {
        Ok(self.leak_code())
    }

    fn description(&self) -> &str {
        "simulated sump"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> SimConfig {
        SimConfig {
            noise_codes: 0,
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn fills_then_drains_between_switch_points() {
        let mut sump = SimulatedSump::new(quiet(), Calibration::default());
        let mut switched_on = false;
        let mut switched_off = false;

        for _ in 0..5000 {
            let was_pumping = sump.is_pumping();
            sump.step(1.0);
            switched_on |= !was_pumping && sump.is_pumping();
            switched_off |= was_pumping && !sump.is_pumping();
            assert!(sump.level_mm() > 100.0 && sump.level_mm() < 210.0);
        }
        assert!(switched_on && switched_off);
    }

    #[tokio::test(start_paused = true)]
    async fn depth_codes_invert_the_calibration() {
        let calibration = Calibration::default();
        let mut sump = SimulatedSump::new(quiet(), calibration.clone());

        let codes = [sump.read_depth_code().await.unwrap()];
        let depth = calibration.depth_from_codes(&codes).unwrap();
        assert!((depth - 130.0).abs() <= calibration.mm_per_lsb);
    }

    #[tokio::test(start_paused = true)]
    async fn level_follows_runtime_clock() {
        let config = SimConfig {
            time_scale: 10.0,
            ..quiet()
        };
        let mut sump = SimulatedSump::new(config, Calibration::default());

        tokio::time::advance(std::time::Duration::from_secs(10)).await;
        sump.read_depth_code().await.unwrap();
        // 100 simulated seconds at 0.08 mm/s
        assert!((sump.level_mm() - 138.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn leak_episode_lasts_configured_reads() {
        let config = SimConfig {
            leak_chance: 1.0,
            leak_reads: 3,
            ..quiet()
        };
        let mut sump = SimulatedSump::new(config, Calibration::default());
        for _ in 0..3 {
            assert_eq!(sump.read_leak_code().await.unwrap(), 40);
        }
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        assert!(SimConfig::default().validate().is_ok());

        let nan_chance = SimConfig {
            leak_chance: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(nan_chance.validate(), Err(AdapterError::Config(_))));

        let inverted = SimConfig {
            pump_on_mm: 100.0,
            pump_off_mm: 150.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let frozen = SimConfig {
            time_scale: 0.0,
            ..Default::default()
        };
        assert!(frozen.validate().is_err());
    }

    #[tokio::test]
    async fn nan_leak_chance_reads_dry() {
        let config = SimConfig {
            leak_chance: f64::NAN,
            ..quiet()
        };
        let mut sump = SimulatedSump::new(config, Calibration::default());
        for _ in 0..10 {
            assert!(sump.read_leak_code().await.unwrap() <= 2);
        }
    }

    #[tokio::test]
    async fn no_leak_stays_below_threshold() {
        let mut sump = SimulatedSump::new(quiet(), Calibration::default());
        for _ in 0..100 {
            assert!(sump.read_leak_code().await.unwrap() <= 2);
        }
    }
}
