use hashbrown::HashMap;

use super::key::PartitionKey;
use crate::models::PointRecord;

/// Resolved records grouped by grid cell, in arrival order within each cell.
#[derive(Debug, Default)]
pub struct PartitionGroups {
    groups: HashMap<PartitionKey, Vec<PointRecord>>,
    total: usize,
}

impl PartitionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the group of the cell containing it.
    pub fn push(&mut self, record: PointRecord) -> PartitionKey {
        let key = PartitionKey::for_coordinate(record.location);
        self.groups.entry(key).or_default().push(record);
        self.total += 1;
        key
    }

    pub fn get(&self, key: &PartitionKey) -> Option<&[PointRecord]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Number of non-empty partitions.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of records across all partitions.
    pub fn record_count(&self) -> usize {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartitionKey, &Vec<PointRecord>)> {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn record(lat: f64, lon: f64, name: &str) -> PointRecord {
        PointRecord::new(Coordinate { lat, lon }, Some(name.to_string()))
    }

    #[test]
    fn test_groups_by_cell_in_arrival_order() {
        let mut groups = PartitionGroups::new();
        let k1 = groups.push(record(51.501, -0.121, "first"));
        groups.push(record(40.0, 3.0, "elsewhere"));
        let k2 = groups.push(record(51.509, -0.129, "second"));

        assert_eq!(k1, k2);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.record_count(), 3);

        let names: Vec<&str> = groups
            .get(&k1)
            .unwrap()
            .iter()
            .filter_map(|r| r.name.as_deref())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_empty() {
        let groups = PartitionGroups::new();
        assert!(groups.is_empty());
        assert_eq!(groups.record_count(), 0);
        assert_eq!(groups.iter().count(), 0);
    }
}
