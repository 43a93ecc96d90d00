//! GPS Simulation Library
//!
//! Simulates cars driving over a road network read from GeoJSON and records
//! their positions tick by tick.

pub mod io;
pub mod simulation;
