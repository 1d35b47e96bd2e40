//! Core data models for the extraction pipeline.

pub mod coordinate;
pub mod entity;
pub mod record;

pub use coordinate::Coordinate;
pub use entity::RawEntity;
pub use record::{NearbyRecord, PointRecord};
