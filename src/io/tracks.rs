//! Writing simulated car positions as GeoJSON

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Local};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use log::info;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::simulation::{Crs, StepRecord};

/// Timestamp layout of the `timestamp` property
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

const GEOJSON_EXTENSION: &str = "geojson";

/// Normalise a requested output file name
///
/// Spaces are removed and a missing extension becomes `.geojson`. Any other
/// extension is rejected.
pub fn output_file_name(requested: &str) -> Result<String> {
    let name: String = requested.chars().filter(|c| *c != ' ').collect();

    match name.split_once('.') {
        Some((stem, extension)) => {
            if extension != GEOJSON_EXTENSION {
                bail!("The output file should have the extension .{}", GEOJSON_EXTENSION);
            }
            if stem.is_empty() {
                bail!("The output file name is empty");
            }
            Ok(name)
        }
        None => {
            if name.is_empty() {
                bail!("The output file name is empty");
            }
            info!("The .{} extension will be added", GEOJSON_EXTENSION);
            Ok(format!("{}.{}", name, GEOJSON_EXTENSION))
        }
    }
}

/// Build the output `FeatureCollection`: one point feature per record
///
/// Records get running ids starting at 1. Timestamps are `started_at` plus
/// the record's simulated time. The `crs` member carries the canonical name
/// of `crs`, whatever alias the road file used.
pub fn track_collection(
    records: &[StepRecord],
    crs: Crs,
    started_at: DateTime<Local>,
) -> FeatureCollection {
    let features = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let timestamp = started_at + Duration::milliseconds((record.time * 1000.0).round() as i64);

            let mut properties = JsonObject::new();
            properties.insert("id".to_string(), json!(index + 1));
            properties.insert("car_id".to_string(), json!(record.car_id.0));
            properties.insert(
                "timestamp".to_string(),
                json!(timestamp.format(TIMESTAMP_FORMAT).to_string()),
            );
            properties.insert("speed".to_string(), json!(record.speed));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    record.position.x,
                    record.position.y,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("name".to_string(), json!("exported"));
    foreign_members.insert(
        "crs".to_string(),
        json!({ "type": "name", "properties": { "name": crs.name() } }),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Write the records to `<results_dir>/<file_name>`, creating the directory
pub fn write_track_file(
    results_dir: &Path,
    file_name: &str,
    records: &[StepRecord],
    crs: Crs,
    started_at: DateTime<Local>,
) -> Result<PathBuf> {
    let file_name = output_file_name(file_name)?;
    fs::create_dir_all(results_dir)
        .with_context(|| format!("Failed to create results directory {}", results_dir.display()))?;

    let path = results_dir.join(file_name);
    let collection = track_collection(records, crs, started_at);
    fs::write(&path, GeoJson::from(collection).to_string())
        .with_context(|| format!("Failed to write results to {}", path.display()))?;

    info!("Wrote {} positions to {}", records.len(), path.display());
    Ok(path)
}
