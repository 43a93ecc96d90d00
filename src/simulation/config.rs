//! Simulation settings

use anyhow::{bail, Result};

use super::speed::SpeedModel;
use super::types::{DEFAULT_MAX_ACCELERATION, DEFAULT_MAX_DECELERATION};

/// Knobs for a simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Number of cars to spawn
    pub car_count: usize,
    /// Lower bound of initial car speed (km/h)
    pub min_speed: f64,
    /// Upper bound of initial car speed (km/h)
    pub max_speed: f64,
    pub max_acceleration: f64,
    pub max_deceleration: f64,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            car_count: 10,
            min_speed: 1.0,
            max_speed: 50.0,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            max_deceleration: DEFAULT_MAX_DECELERATION,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("max_acceleration", self.max_acceleration),
            ("max_deceleration", self.max_deceleration),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{} must be a non-negative number, got {}", name, value);
            }
        }

        if self.min_speed > self.max_speed {
            bail!(
                "min_speed ({}) must not exceed max_speed ({})",
                self.min_speed,
                self.max_speed
            );
        }

        Ok(())
    }

    pub fn speed_model(&self) -> SpeedModel {
        SpeedModel::new(self.max_acceleration, self.max_deceleration)
    }
}
