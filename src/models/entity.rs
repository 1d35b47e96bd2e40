//! Raw entities handed over by a map decoder.

use osmpbfreader::Tags;

use super::Coordinate;

/// A decoded OSM object, before classification.
#[derive(Debug, Clone)]
pub enum RawEntity {
    /// A single point.
    Node {
        id: i64,
        coord: Coordinate,
        tags: Tags,
    },
    /// An ordered path of points, open or closed.
    Way {
        id: i64,
        points: Vec<Coordinate>,
        tags: Tags,
    },
}

impl RawEntity {
    pub fn id(&self) -> i64 {
        match self {
            RawEntity::Node { id, .. } | RawEntity::Way { id, .. } => *id,
        }
    }
}
