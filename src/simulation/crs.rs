//! Coordinate reference systems understood by the simulator
//!
//! Road lengths are always measured after reprojecting into spherical
//! Web Mercator (EPSG:3857), which gives every segment a length in meters
//! regardless of the CRS the road file was written in.

use std::f64::consts::FRAC_PI_4;
use std::fmt;
use std::str::FromStr;

use super::road_network::NetworkError;
use super::types::Position;

/// Sphere radius used by EPSG:3857
pub const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude beyond which Web Mercator is undefined in practice
pub const WEB_MERCATOR_MAX_LATITUDE: f64 = 85.051_128_78;

/// Source CRS of a road network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    /// Geographic longitude/latitude in degrees (EPSG:4326, OGC:CRS84 axis order)
    #[default]
    Wgs84,
    /// Spherical Web Mercator in meters (EPSG:3857)
    WebMercator,
}

impl Crs {
    /// Canonical name, as echoed into output files
    pub fn name(&self) -> &'static str {
        match self {
            Crs::Wgs84 => "EPSG:4326",
            Crs::WebMercator => "EPSG:3857",
        }
    }

    /// Reproject a native coordinate into the metric CRS
    pub fn to_metric(&self, position: Position) -> Position {
        match self {
            Crs::WebMercator => position,
            Crs::Wgs84 => {
                let lat = position
                    .y
                    .clamp(-WEB_MERCATOR_MAX_LATITUDE, WEB_MERCATOR_MAX_LATITUDE)
                    .to_radians();
                Position {
                    x: WEB_MERCATOR_RADIUS * position.x.to_radians(),
                    y: WEB_MERCATOR_RADIUS * (FRAC_PI_4 + lat / 2.0).tan().ln(),
                }
            }
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Crs {
    type Err = NetworkError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "EPSG:4326"
            | "CRS84"
            | "OGC:CRS84"
            | "URN:OGC:DEF:CRS:OGC:1.3:CRS84"
            | "URN:OGC:DEF:CRS:EPSG::4326" => Ok(Crs::Wgs84),
            "EPSG:3857" | "EPSG:900913" | "URN:OGC:DEF:CRS:EPSG::3857" => Ok(Crs::WebMercator),
            _ => Err(NetworkError::UnsupportedCrs(name.to_string())),
        }
    }
}
