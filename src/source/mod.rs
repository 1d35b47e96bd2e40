//! Map decoders that turn an OSM file into a stream of [`RawEntity`] values.

mod node_store;
mod pbf;
mod xml;

use std::path::Path;

use crate::classify::PoiFilter;
use crate::error::Result;
use crate::models::RawEntity;

pub use node_store::NodeStore;
pub use pbf::PbfSource;
pub use xml::XmlSource;

/// A decoder that hands entities to `visit` one at a time.
///
/// Returning an error from `visit` stops the read and propagates the error.
pub trait EntitySource {
    fn read_entities(&mut self, visit: &mut dyn FnMut(RawEntity) -> Result<()>) -> Result<()>;
}

/// Pick a decoder from the file extension: `.osm` is XML, anything else PBF.
///
/// `filter` tells the decoder which ways need their geometry resolved.
pub fn open_source(path: &Path, filter: PoiFilter) -> Result<Box<dyn EntitySource>> {
    let ext = path.extension().and_then(|value| value.to_str());
    match ext {
        Some("osm") => Ok(Box::new(XmlSource::open(path, filter)?)),
        _ => Ok(Box::new(PbfSource::open(path, filter)?)),
    }
}
