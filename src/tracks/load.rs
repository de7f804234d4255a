//! CSV track-table loader.
//!
//! # CSV format
//!
//! One row per track point, header required. Column names accept a few aliases.
//!
//! ```csv
//! long,lat,group,group.regroup,year,nation
//! -5.2,36.1,1,1.1,1791,Spanish
//! -9.8,38.7,1,1.1,1791,Spanish
//! -60.1,14.2,2,2.1,1792,British
//! ```
//!
//! Coordinates and years are parsed leniently (see [`Cell`]): a bad cell does not fail the load,
//! it fails the frame that draws it.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::foundation::error::{VoyageError, VoyageResult};
use crate::tracks::point::{Cell, TrackPoint};
use crate::tracks::table::TrackTable;

#[derive(Deserialize)]
struct TrackRecord {
    #[serde(alias = "lon", alias = "longitude")]
    long: String,
    #[serde(alias = "latitude")]
    lat: String,
    #[serde(alias = "trip")]
    group: String,
    #[serde(rename = "group.regroup", alias = "regroup", alias = "subpath")]
    regroup: String,
    year: String,
    #[serde(alias = "nationality")]
    nation: String,
}

/// Load a track table from a CSV file.
#[tracing::instrument]
pub fn load_tracks_csv(path: &Path) -> VoyageResult<TrackTable> {
    let file = std::fs::File::open(path).map_err(|e| {
        VoyageError::load(format!(
            "failed to open track table '{}': {e}",
            path.display()
        ))
    })?;
    let table = load_tracks_reader(file)
        .map_err(|e| VoyageError::load(format!("{}: {e}", path.display())))?;
    tracing::info!(rows = table.len(), "loaded track table");
    Ok(table)
}

/// Like [`load_tracks_csv`] but accepts any `Read` source.
pub fn load_tracks_reader<R: Read>(reader: R) -> VoyageResult<TrackTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| VoyageError::load(format!("failed to read header row: {e}")))?
        .clone();

    let mut points = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| VoyageError::load(format!("malformed csv: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: TrackRecord = record
            .deserialize(Some(&headers))
            .map_err(|e| VoyageError::load(format!("line {line}: {e}")))?;
        points.push(TrackPoint {
            line,
            lon: Cell::parse(&row.long),
            lat: Cell::parse(&row.lat),
            trip: row.group,
            subpath: row.regroup,
            year: Cell::parse(&row.year),
            nation: row.nation,
        });
    }

    Ok(TrackTable::new(points))
}

#[cfg(test)]
#[path = "../../tests/unit/tracks/load.rs"]
mod tests;
