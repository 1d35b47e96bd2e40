//! Grid cell keys at 0.01 degree resolution.

use std::fmt;
use std::str::FromStr;

use crate::error::{ExtractError, Result};
use crate::models::Coordinate;

/// Number of cells per degree on each axis.
const CELLS_PER_DEGREE: f64 = 100.0;

/// One 0.01° x 0.01° grid cell, identified by its lower-left corner.
///
/// Renders as `"{lat:.2}x{lon:.2}"`, e.g. `51.50x-0.13`. The rendered form is
/// also the partition file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    lat_cell: i64,
    lon_cell: i64,
}

impl PartitionKey {
    /// The cell containing `coord`. Floors, never rounds.
    pub fn for_coordinate(coord: Coordinate) -> Self {
        Self {
            lat_cell: (coord.lat * CELLS_PER_DEGREE).floor() as i64,
            lon_cell: (coord.lon * CELLS_PER_DEGREE).floor() as i64,
        }
    }

    /// South-west corner of the cell.
    pub fn lower_left(&self) -> Coordinate {
        Coordinate {
            lat: self.lat_cell as f64 / CELLS_PER_DEGREE,
            lon: self.lon_cell as f64 / CELLS_PER_DEGREE,
        }
    }

    /// File name of the partition artifact for this cell.
    pub fn file_name(&self) -> String {
        format!("{}.json", self)
    }

    /// All cells intersecting the box spanned by `south_west` and `north_east`,
    /// latitude rows first, then longitude within a row.
    ///
    /// Keys are produced lazily; check [`PartitionKey::covering_count`] before
    /// walking a box of unknown size.
    pub fn covering(
        south_west: Coordinate,
        north_east: Coordinate,
    ) -> impl Iterator<Item = PartitionKey> {
        let sw = Self::for_coordinate(south_west);
        let ne = Self::for_coordinate(north_east);

        (sw.lat_cell..=ne.lat_cell).flat_map(move |lat_cell| {
            (sw.lon_cell..=ne.lon_cell).map(move |lon_cell| PartitionKey { lat_cell, lon_cell })
        })
    }

    /// Number of keys [`PartitionKey::covering`] yields for the same box.
    pub fn covering_count(south_west: Coordinate, north_east: Coordinate) -> u64 {
        let sw = Self::for_coordinate(south_west);
        let ne = Self::for_coordinate(north_east);

        let span = |from: i64, to: i64| -> u64 {
            if to < from {
                0
            } else {
                (to.saturating_sub(from) as u64).saturating_add(1)
            }
        };
        span(sw.lat_cell, ne.lat_cell).saturating_mul(span(sw.lon_cell, ne.lon_cell))
    }
}

/// Key of the cell containing `coord`.
pub fn partition_key(coord: Coordinate) -> PartitionKey {
    PartitionKey::for_coordinate(coord)
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let corner = self.lower_left();
        write!(f, "{:.2}x{:.2}", corner.lat, corner.lon)
    }
}

impl FromStr for PartitionKey {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ExtractError::InvalidPartitionKey(s.to_string());
        let stem = s.strip_suffix(".json").unwrap_or(s);
        let (lat, lon) = stem.split_once('x').ok_or_else(invalid)?;

        let parse_cell = |part: &str| -> Result<i64> {
            let (_, decimals) = part.split_once('.').ok_or_else(invalid)?;
            if decimals.len() != 2 {
                return Err(invalid());
            }
            let degrees = part.parse::<f64>().map_err(|_| invalid())?;
            Ok((degrees * CELLS_PER_DEGREE).round() as i64)
        };

        Ok(Self {
            lat_cell: parse_cell(lat)?,
            lon_cell: parse_cell(lon)?,
        })
    }
}
