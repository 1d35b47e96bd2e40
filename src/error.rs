//! Error type shared by the extraction pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A matching multi-point entity carried no vertices.
    #[error("way {id} has no resolvable points")]
    InvalidGeometry { id: i64 },

    /// A way selected for geometry references a node absent from the input.
    #[error("way {way} references node {node}, which is not in the input")]
    UnresolvedNode { way: i64, node: i64 },

    /// Latitude or longitude outside the valid degree range.
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("input path is not an existing file: {}", .0.display())]
    InvalidInputPath(PathBuf),

    #[error("output path is not an existing directory: {}", .0.display())]
    InvalidOutputPath(PathBuf),

    /// A partition file could not be created or written.
    #[error("failed to write partition {}: {source}", path.display())]
    OutputWriteError { path: PathBuf, source: io::Error },

    #[error("failed to decode PBF input: {0}")]
    Pbf(#[from] osmpbfreader::Error),

    #[error("failed to decode OSM XML input: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("node coordinate store error: {0}")]
    NodeStore(#[from] sled::Error),

    #[error("invalid partition key: {0:?}")]
    InvalidPartitionKey(String),

    /// A lookup box spans more grid cells than a query may open.
    #[error("query box spans {cells} partitions, more than the limit of {limit}")]
    BoxTooLarge { cells: u64, limit: u64 },

    #[error("search radius must be a finite, non-negative number of meters, got {0}")]
    InvalidRadius(f64),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read partition file {}: {source}", path.display())]
    PartitionRead {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
