use hashbrown::{HashMap, HashSet};
use osmpbfreader::{NodeId, OsmObj, OsmPbfReader, Tags, WayId};
use sled::Db;
use std::io::{Read, Seek};
use tempfile::{Builder, TempDir};
use tracing::info;

use crate::error::{ExtractError, Result};
use crate::models::Coordinate;

/// Coordinates of the nodes referenced by matching ways.
///
/// Coordinates live in a throwaway sled database so that only the way → node
/// lists are held in memory. The database directory is removed on drop.
pub struct NodeStore {
    node_db: Db,
    way_nodes: HashMap<WayId, Vec<NodeId>>,
    _dir: TempDir,
}

impl NodeStore {
    /// Scan the file twice: once for ways accepted by `filter`, once for the
    /// coordinates of the nodes they reference.
    pub fn build<R: Read + Seek, F>(reader: &mut OsmPbfReader<R>, filter: F) -> Result<Self>
    where
        F: Fn(&Tags) -> bool,
    {
        info!("Pass 1/3: Identifying matching ways...");
        reader.rewind()?;

        let mut way_nodes = HashMap::new();
        let mut needed_nodes = HashSet::new();

        for obj in reader.iter() {
            if let OsmObj::Way(way) = obj? {
                if filter(&way.tags) {
                    needed_nodes.extend(way.nodes.iter().copied());
                    way_nodes.insert(way.id, way.nodes);
                }
            }
        }

        info!(
            "Found {} matching ways, referencing {} nodes",
            way_nodes.len(),
            needed_nodes.len()
        );

        info!("Pass 2/3: Storing node coordinates...");
        reader.rewind()?;

        let dir = Builder::new().prefix("pubgrid-nodes-").tempdir()?;
        let db = sled::open(dir.path())?;

        let mut stored = 0usize;
        for obj in reader.iter() {
            if let OsmObj::Node(node) = obj? {
                if needed_nodes.contains(&node.id) {
                    let mut value = [0u8; 16];
                    value[0..8].copy_from_slice(&node.lat().to_be_bytes());
                    value[8..16].copy_from_slice(&node.lon().to_be_bytes());
                    db.insert(node.id.0.to_be_bytes(), &value[..])?;
                    stored += 1;
                }
            }
        }

        db.flush()?;
        info!("Stored {} node coordinates", stored);

        Ok(Self {
            node_db: db,
            way_nodes,
            _dir: dir,
        })
    }

    /// Whether `way_id` was accepted by the filter during [`NodeStore::build`].
    pub fn contains_way(&self, way_id: WayId) -> bool {
        self.way_nodes.contains_key(&way_id)
    }

    /// Ordered coordinates of a stored way. Every referenced node must have
    /// been present in the input.
    pub fn resolve_way(&self, way_id: WayId) -> Result<Vec<Coordinate>> {
        let Some(nodes) = self.way_nodes.get(&way_id) else {
            return Ok(Vec::new());
        };

        let mut points = Vec::with_capacity(nodes.len());
        for nid in nodes {
            match self.node_db.get(nid.0.to_be_bytes())? {
                Some(bytes) if bytes.len() == 16 => {
                    let mut lat = [0u8; 8];
                    let mut lon = [0u8; 8];
                    lat.copy_from_slice(&bytes[0..8]);
                    lon.copy_from_slice(&bytes[8..16]);
                    points.push(Coordinate::new(f64::from_be_bytes(lat), f64::from_be_bytes(lon))?);
                }
                _ => {
                    return Err(ExtractError::UnresolvedNode {
                        way: way_id.0,
                        node: nid.0,
                    })
                }
            }
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Cursor;

    const PUBS: &[u8] = include_bytes!("../../tests/fixtures/pubs.osm.pbf");
    const MISSING_NODE: &[u8] = include_bytes!("../../tests/fixtures/missing-node.osm.pbf");

    fn is_pub(tags: &Tags) -> bool {
        tags.contains("amenity", "pub")
    }

    #[test]
    fn test_resolves_way_as_lat_then_lon() {
        let mut reader = OsmPbfReader::new(Cursor::new(PUBS));
        let store = NodeStore::build(&mut reader, is_pub).unwrap();

        assert!(store.contains_way(WayId(100)));
        assert!(store.contains_way(WayId(101)));
        assert!(!store.contains_way(WayId(102)));

        let points = store.resolve_way(WayId(100)).unwrap();
        let expected = [
            (51.5145, -0.1315),
            (51.5145, -0.1305),
            (51.5155, -0.1305),
            (51.5155, -0.1315),
        ];
        assert_eq!(points.len(), expected.len());
        for (point, (lat, lon)) in points.iter().zip(expected) {
            assert_abs_diff_eq!(point.lat, lat, epsilon = 1e-7);
            assert_abs_diff_eq!(point.lon, lon, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_unknown_way_is_empty() {
        let mut reader = OsmPbfReader::new(Cursor::new(PUBS));
        let store = NodeStore::build(&mut reader, is_pub).unwrap();
        assert!(store.resolve_way(WayId(102)).unwrap().is_empty());
    }

    #[test]
    fn test_missing_node_is_an_error() {
        let mut reader = OsmPbfReader::new(Cursor::new(MISSING_NODE));
        let store = NodeStore::build(&mut reader, is_pub).unwrap();

        let err = store.resolve_way(WayId(200)).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnresolvedNode { way: 200, node: 404 }
        ));
    }
}
