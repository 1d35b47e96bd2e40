//! Grid partitioning of resolved points.
//!
//! Points are bucketed into 0.01° x 0.01° cells keyed by the cell's
//! lower-left corner, and each non-empty cell is written to its own JSON file.

mod group;
mod key;
mod writer;

pub use group::PartitionGroups;
pub use key::{partition_key, PartitionKey};
pub use writer::{read_box, read_near, read_partition, write_partitions, MAX_LOOKUP_CELLS};
