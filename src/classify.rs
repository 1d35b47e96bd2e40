//! Decides which raw entities are target points of interest.

use osmpbfreader::Tags;
use serde::Deserialize;

use crate::error::Result;
use crate::geometry::spherical_centroid;
use crate::models::{PointRecord, RawEntity};

/// Tag carrying the display name.
const NAME_TAG: &str = "name";

/// Single `key=value` tag that marks a target point of interest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoiFilter {
    pub key: String,
    pub value: String,
}

impl Default for PoiFilter {
    fn default() -> Self {
        Self {
            key: "amenity".to_string(),
            value: "pub".to_string(),
        }
    }
}

impl PoiFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether the category tag equals the configured value.
    pub fn matches(&self, tags: &Tags) -> bool {
        tags.contains(&self.key, &self.value)
    }

    /// Whether a way with these tags would produce a record, so its geometry
    /// has to be resolved. Decoders skip every other way.
    pub fn needs_geometry(&self, tags: &Tags) -> bool {
        self.matches(tags) && way_name(tags).is_some()
    }

    /// Turn a raw entity into a point record, or `None` if it is not a target.
    ///
    /// Nodes only need the category tag; their name is optional. Ways also
    /// need a non-empty name and are reduced to a single point with
    /// [`spherical_centroid`]. Unnamed ways are dropped without error.
    pub fn classify(&self, entity: RawEntity) -> Result<Option<PointRecord>> {
        match entity {
            RawEntity::Node { coord, tags, .. } => {
                if !self.matches(&tags) {
                    return Ok(None);
                }
                let name = tags.get(NAME_TAG).map(|n| n.to_string());
                Ok(Some(PointRecord::new(coord, name)))
            }
            RawEntity::Way { id, points, tags } => {
                if !self.matches(&tags) {
                    return Ok(None);
                }
                let Some(name) = way_name(&tags).map(str::to_string) else {
                    return Ok(None);
                };
                let location = spherical_centroid(id, &points)?;
                Ok(Some(PointRecord::new(location, Some(name))))
            }
        }
    }
}

/// Name of a way, if it carries a non-empty one.
fn way_name(tags: &Tags) -> Option<&str> {
    tags.get(NAME_TAG)
        .map(|name| name.as_str())
        .filter(|name| !name.is_empty())
}

impl std::fmt::Display for PoiFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::models::Coordinate;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        let mut tags = Tags::new();
        for (k, v) in pairs {
            tags.insert((*k).into(), (*v).into());
        }
        tags
    }

    fn node(pairs: &[(&str, &str)]) -> RawEntity {
        RawEntity::Node {
            id: 1,
            coord: Coordinate { lat: 51.509, lon: -0.128 },
            tags: tags(pairs),
        }
    }

    fn way(points: Vec<Coordinate>, pairs: &[(&str, &str)]) -> RawEntity {
        RawEntity::Way {
            id: 7,
            points,
            tags: tags(pairs),
        }
    }

    #[test]
    fn test_node_wrong_category() {
        let filter = PoiFilter::default();
        assert!(filter.classify(node(&[("amenity", "bar")])).unwrap().is_none());
        assert!(filter.classify(node(&[("shop", "pub")])).unwrap().is_none());
        assert!(filter.classify(node(&[])).unwrap().is_none());
    }

    #[test]
    fn test_node_without_name() {
        let record = PoiFilter::default()
            .classify(node(&[("amenity", "pub")]))
            .unwrap()
            .unwrap();
        assert_eq!(record.location, Coordinate { lat: 51.509, lon: -0.128 });
        assert_eq!(record.name, None);
    }

    #[test]
    fn test_node_with_name() {
        let record = PoiFilter::default()
            .classify(node(&[("amenity", "pub"), ("name", "The Crown")]))
            .unwrap()
            .unwrap();
        assert_eq!(record.name.as_deref(), Some("The Crown"));
    }

    #[test]
    fn test_unnamed_way_is_dropped_before_geometry() {
        let filter = PoiFilter::default();
        // No points: resolving would fail, so a clean None proves the resolver was skipped.
        assert!(filter.classify(way(vec![], &[("amenity", "pub")])).unwrap().is_none());
        assert!(filter
            .classify(way(vec![], &[("amenity", "pub"), ("name", "")]))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_named_way_resolves_centroid() {
        let points = vec![
            Coordinate { lat: 1.0, lon: 1.0 },
            Coordinate { lat: 1.0, lon: -1.0 },
            Coordinate { lat: -1.0, lon: -1.0 },
            Coordinate { lat: -1.0, lon: 1.0 },
        ];
        let record = PoiFilter::default()
            .classify(way(points, &[("amenity", "pub"), ("name", "The Anchor")]))
            .unwrap()
            .unwrap();
        assert!(record.location.lat.abs() < 1e-9);
        assert!(record.location.lon.abs() < 1e-9);
        assert_eq!(record.name.as_deref(), Some("The Anchor"));
    }

    #[test]
    fn test_named_way_without_points_is_invalid() {
        let err = PoiFilter::default()
            .classify(way(vec![], &[("amenity", "pub"), ("name", "Ghost")]))
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidGeometry { id: 7 }));
    }

    #[test]
    fn test_needs_geometry_only_for_named_matches() {
        let filter = PoiFilter::default();
        assert!(filter.needs_geometry(&tags(&[("amenity", "pub"), ("name", "The Anchor")])));
        assert!(!filter.needs_geometry(&tags(&[("amenity", "pub")])));
        assert!(!filter.needs_geometry(&tags(&[("amenity", "pub"), ("name", "")])));
        assert!(!filter.needs_geometry(&tags(&[("highway", "residential"), ("name", "Pub Lane")])));
    }

    #[test]
    fn test_custom_filter() {
        let filter = PoiFilter::new("amenity", "bar");
        assert!(filter.classify(node(&[("amenity", "bar")])).unwrap().is_some());
        assert!(filter.classify(node(&[("amenity", "pub")])).unwrap().is_none());
        assert_eq!(filter.to_string(), "amenity=bar");
    }
}
