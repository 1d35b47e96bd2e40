//! pubgrid - extract points of interest from OSM data into grid partitions
//!
//! This library provides shared types and modules for the extract and query binaries.

pub mod classify;
pub mod config;
pub mod error;
pub mod geometry;
pub mod models;
pub mod partition;
pub mod pipeline;
pub mod source;

pub use classify::PoiFilter;
pub use error::{ExtractError, Result};
pub use models::{Coordinate, NearbyRecord, PointRecord, RawEntity};
pub use partition::{partition_key, PartitionKey};
