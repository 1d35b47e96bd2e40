//! Extraction pipeline: decode, classify, group, then flush.
//!
//! The whole input is consumed before the first partition is written.

use std::path::Path;

use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::classify::PoiFilter;
use crate::error::{ExtractError, Result};
use crate::models::RawEntity;
use crate::partition::{write_partitions, PartitionGroups};
use crate::source::{open_source, EntitySource};

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entities handed over by the decoder.
    pub entities: u64,
    pub matched_nodes: u64,
    pub matched_ways: u64,
    pub partitions: usize,
}

impl RunSummary {
    pub fn records(&self) -> u64 {
        self.matched_nodes + self.matched_ways
    }
}

/// Check that `input` is an existing file and `out_dir` an existing directory.
pub fn validate_paths(input: &Path, out_dir: &Path) -> Result<()> {
    if !input.is_file() {
        return Err(ExtractError::InvalidInputPath(input.to_path_buf()));
    }
    if !out_dir.is_dir() {
        return Err(ExtractError::InvalidOutputPath(out_dir.to_path_buf()));
    }
    Ok(())
}

/// Read every entity from `source` and group the matching ones by cell.
pub fn collect(
    source: &mut dyn EntitySource,
    filter: &PoiFilter,
    progress: &ProgressBar,
) -> Result<(PartitionGroups, RunSummary)> {
    let mut groups = PartitionGroups::new();
    let mut summary = RunSummary::default();

    source.read_entities(&mut |entity| {
        progress.inc(1);
        summary.entities += 1;

        let is_way = matches!(entity, RawEntity::Way { .. });
        let id = entity.id();
        if let Some(record) = filter.classify(entity)? {
            let key = groups.push(record);
            debug!("{} {} -> {}", if is_way { "way" } else { "node" }, id, key);
            if is_way {
                summary.matched_ways += 1;
            } else {
                summary.matched_nodes += 1;
            }
        }
        Ok(())
    })?;

    Ok((groups, summary))
}

/// Run the full pipeline over `source`, writing partitions into `out_dir`.
pub fn run(
    source: &mut dyn EntitySource,
    filter: &PoiFilter,
    out_dir: &Path,
    progress: &ProgressBar,
) -> Result<RunSummary> {
    let (groups, mut summary) = collect(source, filter, progress)?;

    info!(
        "Matched {} nodes and {} ways for {} into {} partitions",
        summary.matched_nodes,
        summary.matched_ways,
        filter,
        groups.len()
    );

    summary.partitions = write_partitions(&groups, out_dir)?;
    Ok(summary)
}

/// Validate paths, open the right decoder for `input` and run the pipeline.
pub fn extract_file(
    input: &Path,
    out_dir: &Path,
    filter: &PoiFilter,
    progress: &ProgressBar,
) -> Result<RunSummary> {
    validate_paths(input, out_dir)?;
    let mut source = open_source(input, filter.clone())?;
    run(source.as_mut(), filter, out_dir, progress)
}
