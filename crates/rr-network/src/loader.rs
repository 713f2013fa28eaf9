//! CSV loaders for static network inputs.
//!
//! Both formats are semicolon-delimited without a header row.
//!
//! # Coordinates
//!
//! ```csv
//! 0;120.5;48.0
//! 1;300.0;52.25
//! ```
//!
//! `id;x;y`.  The same format serves junctions and centroids; apply rows
//! with [`TrafficNetworkBuilder::set_junction_pos`] or
//! [`TrafficNetworkBuilder::set_centroid_pos`].
//!
//! # Region partition
//!
//! ```csv
//! 0;1
//! 1;1
//! 2;2
//! ```
//!
//! `junction;region`.
//!
//! [`TrafficNetworkBuilder::set_junction_pos`]: crate::TrafficNetworkBuilder::set_junction_pos
//! [`TrafficNetworkBuilder::set_centroid_pos`]: crate::TrafficNetworkBuilder::set_centroid_pos

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use rr_core::{NodeId, Point, RegionId};

use crate::{NetworkError, NetworkResult, RegionMap, TrafficNetwork};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PositionRecord {
    id: u32,
    x:  f64,
    y:  f64,
}

#[derive(Deserialize)]
struct RegionRecord {
    junction: u32,
    region:   u16,
}

/// One parsed coordinate row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionRow {
    pub id:  u32,
    pub pos: Point,
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_positions_csv(path: &Path) -> NetworkResult<Vec<PositionRow>> {
    let file = std::fs::File::open(path)?;
    load_positions_reader(file)
}

/// Like [`load_positions_csv`] but accepts any `Read` source.
pub fn load_positions_reader<R: Read>(reader: R) -> NetworkResult<Vec<PositionRow>> {
    semicolon_reader(reader)
        .deserialize::<PositionRecord>()
        .map(|row| {
            let row = row.map_err(|e| NetworkError::Parse(e.to_string()))?;
            Ok(PositionRow { id: row.id, pos: Point::new(row.x, row.y) })
        })
        .collect()
}

pub fn load_regions_csv(path: &Path) -> NetworkResult<RegionMap> {
    let file = std::fs::File::open(path)?;
    load_regions_reader(file)
}

/// Like [`load_regions_csv`] but accepts any `Read` source.
pub fn load_regions_reader<R: Read>(reader: R) -> NetworkResult<RegionMap> {
    let mut map = RegionMap::new();
    for row in semicolon_reader(reader).deserialize::<RegionRecord>() {
        let row = row.map_err(|e| NetworkError::Parse(e.to_string()))?;
        if row.region == RegionId::INVALID.0 {
            return Err(NetworkError::Parse(format!(
                "junction {}: region id {} is reserved",
                row.junction, row.region
            )));
        }
        map.assign(NodeId(row.junction), RegionId(row.region));
    }
    Ok(map)
}

/// Load the partition at `path`, falling back to a single region covering
/// the whole network when the file cannot be opened.
///
/// A file that exists but is malformed is still an error.
pub fn load_regions_csv_or_single(path: &Path, network: &TrafficNetwork) -> NetworkResult<RegionMap> {
    match std::fs::File::open(path) {
        Ok(file) => load_regions_reader(file),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "region file unreadable; using a single region");
            Ok(RegionMap::single_region(network))
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn semicolon_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader)
}
