//! Stochastic speed adjustment

use rand::Rng;

use super::types::{
    DEFAULT_MAX_ACCELERATION, DEFAULT_MAX_DECELERATION, NEAR_END_FRACTION, NEAR_END_SPEED_LIMIT,
};

/// Draws a new speed from the current one and the car's place on its segment
///
/// Near the end of a segment fast cars only slow down and slow cars only
/// speed up. Elsewhere speed drifts randomly in both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedModel {
    /// Largest speed gain per tick (km/h)
    pub max_acceleration: f64,
    /// Largest speed loss per tick (km/h)
    pub max_deceleration: f64,
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self {
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            max_deceleration: DEFAULT_MAX_DECELERATION,
        }
    }
}

impl SpeedModel {
    /// Negative limits are raised to zero
    pub fn new(max_acceleration: f64, max_deceleration: f64) -> Self {
        Self {
            max_acceleration: max_acceleration.max(0.0),
            max_deceleration: max_deceleration.max(0.0),
        }
    }

    /// Speed for the next tick, never below zero
    pub fn next_speed<R: Rng>(
        &self,
        rng: &mut R,
        current_speed: f64,
        remaining_distance: f64,
        segment_length: f64,
    ) -> f64 {
        let remaining_fraction = if segment_length > 0.0 {
            remaining_distance / segment_length
        } else {
            0.0
        };

        let delta = if remaining_fraction < NEAR_END_FRACTION {
            if current_speed > NEAR_END_SPEED_LIMIT {
                rng.random_range(-self.max_deceleration..=0.0)
            } else {
                rng.random_range(0.0..=self.max_acceleration)
            }
        } else {
            rng.random_range(-self.max_deceleration..=self.max_acceleration)
        };

        (current_speed + delta).max(0.0)
    }
}
