//! OSM PBF decoding via `osmpbfreader`.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use osmpbfreader::{OsmObj, OsmPbfReader};
use tracing::info;

use super::node_store::NodeStore;
use super::EntitySource;
use crate::classify::PoiFilter;
use crate::error::Result;
use crate::models::{Coordinate, RawEntity};

/// Reads nodes and ways from a PBF file.
///
/// Way geometry is only resolved for ways that can yield a record (see
/// [`PoiFilter::needs_geometry`]); every other way is skipped without being
/// materialized.
pub struct PbfSource<R: Read + Seek> {
    reader: OsmPbfReader<R>,
    filter: PoiFilter,
}

impl PbfSource<BufReader<File>> {
    pub fn open(path: &Path, filter: PoiFilter) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), filter))
    }
}

impl<R: Read + Seek> PbfSource<R> {
    pub fn new(inner: R, filter: PoiFilter) -> Self {
        Self {
            reader: OsmPbfReader::new(inner),
            filter,
        }
    }
}

impl<R: Read + Seek> EntitySource for PbfSource<R> {
    fn read_entities(&mut self, visit: &mut dyn FnMut(RawEntity) -> Result<()>) -> Result<()> {
        let filter = &self.filter;
        let store = NodeStore::build(&mut self.reader, |tags| filter.needs_geometry(tags))?;

        info!("Pass 3/3: Reading entities...");
        self.reader.rewind()?;

        for obj in self.reader.iter() {
            match obj? {
                OsmObj::Node(node) => {
                    // Untagged nodes are bare way vertices.
                    if node.tags.is_empty() {
                        continue;
                    }
                    let coord = Coordinate::new(node.lat(), node.lon())?;
                    visit(RawEntity::Node {
                        id: node.id.0,
                        coord,
                        tags: node.tags,
                    })?;
                }
                OsmObj::Way(way) => {
                    if !store.contains_way(way.id) {
                        continue;
                    }
                    let points = store.resolve_way(way.id)?;
                    visit(RawEntity::Way {
                        id: way.id.0,
                        points,
                        tags: way.tags,
                    })?;
                }
                OsmObj::Relation(_) => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use std::io::Cursor;

    fn read(bytes: &'static [u8]) -> Result<Vec<RawEntity>> {
        let mut source = PbfSource::new(Cursor::new(bytes), PoiFilter::default());
        let mut entities = Vec::new();
        source.read_entities(&mut |entity| {
            entities.push(entity);
            Ok(())
        })?;
        Ok(entities)
    }

    #[test]
    fn test_reads_tagged_nodes_and_named_ways() {
        let entities = read(include_bytes!("../../tests/fixtures/pubs.osm.pbf")).unwrap();
        let ids: Vec<i64> = entities.iter().map(RawEntity::id).collect();
        // Nodes 1 and 6 carry tags; way 101 is unnamed and way 102 is not a pub.
        assert_eq!(ids, vec![1, 6, 100]);

        match &entities[2] {
            RawEntity::Way { points, tags, .. } => {
                assert_eq!(points.len(), 4);
                assert_eq!(tags.get("name").map(|n| n.as_str()), Some("The Anchor"));
            }
            other => panic!("expected way, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_node_aborts() {
        let err = read(include_bytes!("../../tests/fixtures/missing-node.osm.pbf")).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnresolvedNode { way: 200, node: 404 }
        ));
    }
}
