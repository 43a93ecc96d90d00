//! Reading road networks from GeoJSON files

use anyhow::{bail, Context, Result};
use geo_types::{Coord, LineString, MultiLineString};
use geojson::{GeoJson, Value};
use log::warn;
use std::fs;
use std::path::Path;

use crate::simulation::{Crs, SegmentGeometry, SimRoadNetwork};

/// CRS name assumed when a file carries no `crs` member
const DEFAULT_CRS_NAME: &str = "EPSG:4326";

/// Road geometries and CRS metadata read from one file
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSource {
    /// CRS name as written in the file
    pub crs_name: String,
    pub geometries: Vec<SegmentGeometry>,
}

impl RoadSource {
    /// Resolve the CRS name
    pub fn crs(&self) -> Result<Crs> {
        Ok(self.crs_name.parse::<Crs>()?)
    }

    /// Build the road network described by this file
    pub fn into_network(self) -> Result<SimRoadNetwork> {
        let crs = self.crs()?;
        Ok(SimRoadNetwork::build(self.geometries, crs)?)
    }
}

/// Read a GeoJSON `FeatureCollection` of road lines
pub fn read_road_file(path: &Path) -> Result<RoadSource> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read road file {}", path.display()))?;
    parse_road_collection(&contents)
        .with_context(|| format!("Failed to parse road file {}", path.display()))
}

/// Parse GeoJSON text holding a `FeatureCollection` of road lines
///
/// `LineString` features become simple segments and `MultiLineString`
/// features composite ones. Anything else is skipped.
pub fn parse_road_collection(contents: &str) -> Result<RoadSource> {
    let geojson = contents.parse::<GeoJson>().context("Invalid GeoJSON")?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        bail!("Expected a GeoJSON FeatureCollection");
    };

    let crs_name = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|properties| properties.get("name"))
        .and_then(|name| name.as_str())
        .unwrap_or(DEFAULT_CRS_NAME)
        .to_string();

    let mut geometries = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!("Skipping feature {} without geometry", index);
            continue;
        };

        match geometry.value {
            Value::LineString(line) => {
                let line = to_line_string(&line)
                    .with_context(|| format!("Bad coordinates in feature {}", index))?;
                geometries.push(SegmentGeometry::Simple(line));
            }
            Value::MultiLineString(lines) => {
                let lines = lines
                    .iter()
                    .map(|line| to_line_string(line))
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("Bad coordinates in feature {}", index))?;
                geometries.push(SegmentGeometry::Composite(MultiLineString(lines)));
            }
            _ => warn!("Skipping feature {} with non-line geometry", index),
        }
    }

    Ok(RoadSource {
        crs_name,
        geometries,
    })
}

fn to_line_string(positions: &[Vec<f64>]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => bail!("Position {:?} has fewer than 2 ordinates", position),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::from)
}

/// Names of the `.geojson` files in `dir`, sorted
pub fn list_road_files(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list road directory {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list road directory {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".geojson") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
