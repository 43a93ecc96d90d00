//! Car movement logic for the GPS simulation
//!
//! A car does not remember which road it is on. Every tick the first
//! segment whose buffer contains the car is looked up again and the car is
//! moved along it.

use log::{debug, info, warn};
use rand::Rng;

use super::road_network::SimRoadNetwork;
use super::speed::SpeedModel;
use super::types::{CarId, Position, SegmentId, BUFFER_TOLERANCE, KMH_TO_MPS};

/// What happened to a car during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarUpdateResult {
    /// Moved along its segment
    Moved(SegmentId),
    /// Ran off its segment and was placed on a connected one
    Transferred { from: SegmentId, to: SegmentId },
    /// Ran off a segment with no connection and stopped
    Stalled(SegmentId),
    /// Not on any segment, left untouched
    OffNetwork,
}

/// A car in the GPS simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimCar {
    pub id: CarId,
    /// Display label, has no effect on movement
    pub name: String,
    pub position: Position,
    /// Speed in km/h
    pub speed: f64,
    /// `true` when travelling toward increasing arc-length
    pub forward: bool,
}

impl SimCar {
    pub fn new(id: CarId, name: impl Into<String>, position: Position, speed: f64, forward: bool) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            speed,
            forward,
        }
    }

    /// Advance the car by `elapsed_secs` seconds
    pub fn update<R: Rng>(
        &mut self,
        elapsed_secs: f64,
        road_network: &SimRoadNetwork,
        speed_model: &SpeedModel,
        rng: &mut R,
    ) -> CarUpdateResult {
        let Some(segment) = road_network.containing(self.position, BUFFER_TOLERANCE) else {
            warn!(
                "Car {:?} at ({}, {}) is not on any road, leaving it in place",
                self.id, self.position.x, self.position.y
            );
            return CarUpdateResult::OffNetwork;
        };

        let distance = self.speed * KMH_TO_MPS * elapsed_secs;
        let length = segment.metric_length();
        let start = segment.project(self.position);
        let target = if self.forward {
            start + distance
        } else {
            start - distance
        };
        let candidate = segment.interpolate(target);

        if segment.within_tolerance(candidate, BUFFER_TOLERANCE) && (0.0..=length).contains(&target) {
            self.position = candidate;
            self.speed = speed_model.next_speed(rng, self.speed, length - target, length);
            return CarUpdateResult::Moved(segment.id);
        }

        self.forward = !self.forward;

        match road_network.nearest_adjacent(segment.id, self.position) {
            Some(next) => {
                self.position = next.interpolate(next.project(self.position));
                debug!(
                    "Car {:?} left segment {:?} for segment {:?}",
                    self.id, segment.id, next.id
                );
                CarUpdateResult::Transferred {
                    from: segment.id,
                    to: next.id,
                }
            }
            None => {
                self.speed = 0.0;
                info!("Car {:?} reached a dead end on segment {:?}", self.id, segment.id);
                CarUpdateResult::Stalled(segment.id)
            }
        }
    }
}
