//! OSM XML decoding via `quick-xml`.
//!
//! Single pass: node coordinates are remembered as they stream by, so ways
//! can be resolved as soon as their closing tag is read. This relies on the
//! usual ordering of OSM XML files (all nodes before all ways).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;
use osmpbfreader::Tags;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::EntitySource;
use crate::classify::PoiFilter;
use crate::error::{ExtractError, Result};
use crate::models::{Coordinate, RawEntity};

struct NodeData {
    id: i64,
    coord: Coordinate,
    tags: Tags,
}

struct WayData {
    id: i64,
    node_refs: Vec<i64>,
    tags: Tags,
}

/// Reads nodes and ways from an `.osm` XML document.
pub struct XmlSource<R: BufRead> {
    reader: Reader<R>,
    filter: PoiFilter,
}

impl XmlSource<BufReader<File>> {
    pub fn open(path: &Path, filter: PoiFilter) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), filter))
    }
}

impl<R: BufRead> XmlSource<R> {
    pub fn new(inner: R, filter: PoiFilter) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.trim_text(true);
        Self { reader, filter }
    }
}

fn get_attr_value(event: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn parse_attr<T: std::str::FromStr>(event: &BytesStart<'_>, key: &[u8]) -> Result<Option<T>> {
    Ok(get_attr_value(event, key)?.and_then(|value| value.parse::<T>().ok()))
}

fn add_tag(event: &BytesStart<'_>, tags: &mut Tags) -> Result<()> {
    let key = get_attr_value(event, b"k")?;
    let value = get_attr_value(event, b"v")?;
    if let (Some(key), Some(value)) = (key, value) {
        tags.insert(key.into(), value.into());
    }
    Ok(())
}

impl<R: BufRead> XmlSource<R> {
    fn finish_node(
        node: NodeData,
        coords: &mut HashMap<i64, Coordinate>,
        visit: &mut dyn FnMut(RawEntity) -> Result<()>,
    ) -> Result<()> {
        coords.insert(node.id, node.coord);
        if node.tags.is_empty() {
            return Ok(());
        }
        visit(RawEntity::Node {
            id: node.id,
            coord: node.coord,
            tags: node.tags,
        })
    }

    fn finish_way(
        &self,
        way: WayData,
        coords: &HashMap<i64, Coordinate>,
        visit: &mut dyn FnMut(RawEntity) -> Result<()>,
    ) -> Result<()> {
        if !self.filter.needs_geometry(&way.tags) {
            return Ok(());
        }

        let points = way
            .node_refs
            .iter()
            .map(|node| {
                coords
                    .get(node)
                    .copied()
                    .ok_or(ExtractError::UnresolvedNode { way: way.id, node: *node })
            })
            .collect::<Result<Vec<Coordinate>>>()?;

        visit(RawEntity::Way {
            id: way.id,
            points,
            tags: way.tags,
        })
    }
}

impl<R: BufRead> EntitySource for XmlSource<R> {
    fn read_entities(&mut self, visit: &mut dyn FnMut(RawEntity) -> Result<()>) -> Result<()> {
        let mut coords: HashMap<i64, Coordinate> = HashMap::new();
        let mut current_node: Option<NodeData> = None;
        let mut current_way: Option<WayData> = None;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let event = self.reader.read_event_into(&mut buf)?;
            let (e, self_closing) = match event {
                Event::Eof => break,
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(e) => {
                    match e.name().as_ref() {
                        b"node" => {
                            if let Some(node) = current_node.take() {
                                Self::finish_node(node, &mut coords, visit)?;
                            }
                        }
                        b"way" => {
                            if let Some(way) = current_way.take() {
                                self.finish_way(way, &coords, visit)?;
                            }
                        }
                        _ => {}
                    }
                    continue;
                }
                _ => continue,
            };

            match e.name().as_ref() {
                b"node" => {
                    let id = parse_attr::<i64>(&e, b"id")?;
                    let lat = parse_attr::<f64>(&e, b"lat")?;
                    let lon = parse_attr::<f64>(&e, b"lon")?;
                    if let (Some(id), Some(lat), Some(lon)) = (id, lat, lon) {
                        let node = NodeData {
                            id,
                            coord: Coordinate::new(lat, lon)?,
                            tags: Tags::new(),
                        };
                        if self_closing {
                            Self::finish_node(node, &mut coords, visit)?;
                        } else {
                            current_node = Some(node);
                        }
                    } else {
                        debug!("Ignoring node element without id/lat/lon");
                    }
                }
                b"way" => {
                    // A self-closing way has neither nodes nor tags.
                    if !self_closing {
                        current_way = parse_attr::<i64>(&e, b"id")?.map(|id| WayData {
                            id,
                            node_refs: Vec::new(),
                            tags: Tags::new(),
                        });
                    }
                }
                b"nd" => {
                    if let Some(way) = current_way.as_mut() {
                        if let Some(reference) = parse_attr::<i64>(&e, b"ref")? {
                            way.node_refs.push(reference);
                        }
                    }
                }
                b"tag" => {
                    if let Some(way) = current_way.as_mut() {
                        add_tag(&e, &mut way.tags)?;
                    } else if let Some(node) = current_node.as_mut() {
                        add_tag(&e, &mut node.tags)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}
