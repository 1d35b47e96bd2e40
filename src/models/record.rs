use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A resolved point of interest, as written to partition files.
///
/// Serializes as `{"location": {"lat": .., "lon": ..}, "name": ..}` with
/// `name` set to `null` when the source entity had no name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub location: Coordinate,
    pub name: Option<String>,
}

impl PointRecord {
    pub fn new(location: Coordinate, name: Option<String>) -> Self {
        Self { location, name }
    }
}

/// A record found by a radius lookup, with its distance from the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyRecord {
    #[serde(flatten)]
    pub record: PointRecord,
    /// Great-circle distance in meters.
    pub distance: f64,
}
