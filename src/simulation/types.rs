//! Core types for the GPS simulation

use geo_types::Coord;

/// A 2D position in the road network's native coordinate reference system
pub type Position = Coord<f64>;

/// A wrapper type for segment IDs
///
/// The wrapped value is the segment's index in construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub usize);

/// A wrapper type for car IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarId(pub u32);

/// Radius of the "on the road" buffer, in native CRS units
pub const BUFFER_TOLERANCE: f64 = 1e-8;

/// Multiplier converting km/h to m/s
pub const KMH_TO_MPS: f64 = 1000.0 / 3600.0;

/// Remaining fraction of a segment below which a car is approaching its end
pub const NEAR_END_FRACTION: f64 = 0.2;

/// Speed above which a car approaching a segment end slows down (km/h)
pub const NEAR_END_SPEED_LIMIT: f64 = 10.0;

/// Default maximum speed gain per tick (km/h)
pub const DEFAULT_MAX_ACCELERATION: f64 = 10.0;

/// Default maximum speed loss per tick (km/h)
pub const DEFAULT_MAX_DECELERATION: f64 = 10.0;

/// Display labels handed out to spawned cars
pub const CAR_MAKES: [&str; 9] = [
    "Toyota",
    "Honda",
    "Ford",
    "Chevrolet",
    "BMW",
    "Mercedes",
    "Audi",
    "Volkswagen",
    "Tesla",
];
