//! Coordinate geometry for multi-point entities.

mod centroid;

pub use centroid::spherical_centroid;
