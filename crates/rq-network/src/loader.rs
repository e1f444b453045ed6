//! CSV loaders for the edge list and the traffic feed.
//!
//! # Edge list format
//!
//! One row per directed segment.  `name`, `speed`, and `length` may be empty.
//!
//! ```csv
//! edge_id,from,to,name,speed,length
//! e1,A,B,Main St,13.89,120
//! e2,B,C,,,
//! ```
//!
//! | Missing field | Default            |
//! |---------------|--------------------|
//! | `name`        | `Street_<edge_id>` |
//! | `speed`       | 13.89 m/s (50 km/h)|
//! | `length`      | 100 m              |
//!
//! Rows with an empty `edge_id`, `from`, or `to` are skipped.
//!
//! # Traffic feed format
//!
//! ```csv
//! edge_id,mean_speed,occupancy,vehicle_count
//! e1,4.5,35,12
//! e2,,10,
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::traffic::SensorReading;
use crate::{NetworkResult, StreetNetwork, StreetNetworkBuilder};

pub const DEFAULT_SPEED: f64 = 13.89;
pub const DEFAULT_LENGTH: f64 = 100.0;

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct EdgeRecord {
    edge_id: String,
    from:    String,
    to:      String,
    #[serde(default)]
    name:    Option<String>,
    #[serde(default)]
    speed:   Option<f64>,
    #[serde(default)]
    length:  Option<f64>,
}

#[derive(Deserialize)]
struct ReadingRecord {
    edge_id:       String,
    #[serde(default)]
    mean_speed:    Option<f64>,
    #[serde(default)]
    occupancy:     Option<f64>,
    #[serde(default)]
    vehicle_count: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and build a [`StreetNetwork`] from an edge-list CSV file.
pub fn load_network_csv(path: &Path) -> NetworkResult<StreetNetwork> {
    let file = std::fs::File::open(path)?;
    load_network_reader(file)
}

/// Like [`load_network_csv`] but accepts any `Read` source.
pub fn load_network_reader<R: Read>(reader: R) -> NetworkResult<StreetNetwork> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut builder = StreetNetworkBuilder::new();
    let mut skipped = 0usize;

    for result in csv_reader.deserialize::<EdgeRecord>() {
        let row = result?;
        if row.edge_id.trim().is_empty() || row.from.trim().is_empty() || row.to.trim().is_empty() {
            skipped += 1;
            continue;
        }
        let name = match row.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_owned(),
            _ => format!("Street_{}", row.edge_id),
        };
        builder.add_edge(
            &row.edge_id,
            row.from.trim(),
            row.to.trim(),
            &name,
            row.length.unwrap_or(DEFAULT_LENGTH),
            row.speed.unwrap_or(DEFAULT_SPEED),
        )?;
    }

    if skipped > 0 {
        warn!(skipped, "edge rows without id or endpoints were skipped");
    }
    builder.build()
}

/// Load traffic sensor readings from a CSV file.
pub fn load_readings_csv(path: &Path) -> NetworkResult<Vec<SensorReading>> {
    let file = std::fs::File::open(path)?;
    load_readings_reader(file)
}

/// Like [`load_readings_csv`] but accepts any `Read` source.
pub fn load_readings_reader<R: Read>(reader: R) -> NetworkResult<Vec<SensorReading>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut readings = Vec::new();
    for result in csv_reader.deserialize::<ReadingRecord>() {
        let row = result?;
        readings.push(SensorReading {
            edge_id:       row.edge_id,
            mean_speed:    row.mean_speed,
            occupancy:     row.occupancy,
            vehicle_count: row.vehicle_count,
        });
    }
    Ok(readings)
}
