//! Flushes partition groups to per-cell JSON files, and reads them back.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use geo::{coord, Distance, Haversine, Intersects, Rect};
use rayon::prelude::*;
use tracing::debug;

use super::group::PartitionGroups;
use super::key::PartitionKey;
use crate::error::{ExtractError, Result};
use crate::models::{Coordinate, NearbyRecord, PointRecord};

/// Most partition files a single lookup may open.
pub const MAX_LOOKUP_CELLS: u64 = 100_000;

/// Write every group to `<out_dir>/<key>.json`, overwriting existing files.
///
/// Partitions are written in parallel and independently of each other. The
/// first failure is returned; files written before it are left in place.
/// Returns the number of files written.
pub fn write_partitions(groups: &PartitionGroups, out_dir: &Path) -> Result<usize> {
    let entries: Vec<(&PartitionKey, &Vec<PointRecord>)> = groups.iter().collect();

    entries
        .par_iter()
        .try_for_each(|(key, records)| write_partition(out_dir, key, records))?;

    Ok(entries.len())
}

fn write_partition(out_dir: &Path, key: &PartitionKey, records: &[PointRecord]) -> Result<()> {
    let path = out_dir.join(key.file_name());
    let write_error = |source: std::io::Error| ExtractError::OutputWriteError {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records).map_err(|e| write_error(e.into()))?;
    writer.flush().map_err(write_error)?;

    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn partition_path(dir: &Path, key: &PartitionKey) -> PathBuf {
    dir.join(key.file_name())
}

/// Load one partition file. A missing file means the cell has no records.
pub fn read_partition(dir: &Path, key: &PartitionKey) -> Result<Option<Vec<PointRecord>>> {
    let path = partition_path(dir, key);
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let records = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| ExtractError::PartitionRead { path, source })?;
    Ok(Some(records))
}

/// All records inside the box spanned by `south_west` and `north_east`,
/// collected from the partition files that cover it.
///
/// Fails with [`ExtractError::BoxTooLarge`] when the box covers more than
/// [`MAX_LOOKUP_CELLS`] cells.
pub fn read_box(
    dir: &Path,
    south_west: Coordinate,
    north_east: Coordinate,
) -> Result<Vec<PointRecord>> {
    check_cell_count(PartitionKey::covering_count(south_west, north_east))?;

    let bounds = Rect::new(
        coord! { x: south_west.lon, y: south_west.lat },
        coord! { x: north_east.lon, y: north_east.lat },
    );

    let mut found = Vec::new();
    for key in PartitionKey::covering(south_west, north_east) {
        let Some(records) = read_partition(dir, &key)? else {
            continue;
        };
        found.extend(
            records
                .into_iter()
                .filter(|r| bounds.intersects(&r.location.to_point())),
        );
    }
    Ok(found)
}

/// All records within `radius` meters of `origin` (haversine distance),
/// nearest first.
pub fn read_near(dir: &Path, origin: Coordinate, radius: f64) -> Result<Vec<NearbyRecord>> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(ExtractError::InvalidRadius(radius));
    }

    let boxes = search_boxes(origin, radius);
    check_cell_count(
        boxes
            .iter()
            .map(|(sw, ne)| PartitionKey::covering_count(*sw, *ne))
            .fold(0u64, u64::saturating_add),
    )?;

    let center = origin.to_point();
    let mut found = Vec::new();
    for (south_west, north_east) in boxes {
        for key in PartitionKey::covering(south_west, north_east) {
            let Some(records) = read_partition(dir, &key)? else {
                continue;
            };
            for record in records {
                let distance = Haversine.distance(center, record.location.to_point());
                if distance <= radius {
                    found.push(NearbyRecord { record, distance });
                }
            }
        }
    }

    found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    debug!("{} records within {} m of {}", found.len(), radius, origin);
    Ok(found)
}

fn check_cell_count(cells: u64) -> Result<()> {
    if cells > MAX_LOOKUP_CELLS {
        return Err(ExtractError::BoxTooLarge {
            cells,
            limit: MAX_LOOKUP_CELLS,
        });
    }
    Ok(())
}

/// Boxes that together contain the circle of `radius` meters around
/// `origin`. A circle crossing the antimeridian is split in two; one that
/// reaches a pole spans every longitude.
fn search_boxes(origin: Coordinate, radius: f64) -> Vec<(Coordinate, Coordinate)> {
    let angular = (radius / Haversine.radius()).to_degrees();
    let south = origin.lat - angular;
    let north = origin.lat + angular;

    if south <= -90.0 || north >= 90.0 {
        return vec![(
            Coordinate { lat: south.max(-90.0), lon: -180.0 },
            Coordinate { lat: north.min(90.0), lon: 180.0 },
        )];
    }

    // Widest longitude offset of a small circle at this latitude.
    let ratio = angular.to_radians().sin() / origin.lat.to_radians().cos();
    let span = ratio.min(1.0).asin().to_degrees();
    let west = origin.lon - span;
    let east = origin.lon + span;

    let corner = |lat: f64, lon: f64| Coordinate { lat, lon };
    if west < -180.0 {
        vec![
            (corner(south, west + 360.0), corner(north, 180.0)),
            (corner(south, -180.0), corner(north, east)),
        ]
    } else if east > 180.0 {
        vec![
            (corner(south, west), corner(north, 180.0)),
            (corner(south, -180.0), corner(north, east - 360.0)),
        ]
    } else {
        vec![(corner(south, west), corner(north, east))]
    }
}
