//! Standalone GPS vehicle simulation
//!
//! This module contains the movement engine and everything it reads: the
//! geometry primitives, the road network and the speed model. It does no I/O
//! and can be driven from tests or from the command line.

mod car;
mod config;
mod crs;
pub mod geometry;
mod road_network;
mod speed;
mod types;
mod world;

pub use car::{CarUpdateResult, SimCar};
pub use config::SimConfig;
pub use crs::{Crs, WEB_MERCATOR_MAX_LATITUDE, WEB_MERCATOR_RADIUS};
pub use geometry::Track;
pub use road_network::{NetworkError, Segment, SegmentGeometry, SimRoadNetwork};
pub use speed::SpeedModel;
pub use types::{
    CarId, Position, SegmentId, BUFFER_TOLERANCE, CAR_MAKES, DEFAULT_MAX_ACCELERATION,
    DEFAULT_MAX_DECELERATION, KMH_TO_MPS, NEAR_END_FRACTION, NEAR_END_SPEED_LIMIT,
};
pub use world::{SimWorld, StepRecord, TickSummary};
