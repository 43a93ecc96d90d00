//! GeoJSON input and output around the simulation

mod roads;
mod tracks;

pub use roads::{list_road_files, parse_road_collection, read_road_file, RoadSource};
pub use tracks::{output_file_name, track_collection, write_track_file, TIMESTAMP_FORMAT};
