//! Pathway module - Turn student records into a cohort transition graph
//!
//! Stages run strictly downstream: label records into per-student timelines,
//! synthesize one transition per student per step (reducing concurrent states
//! at each bucket), aggregate transitions into edges, then assemble the graph
//! with node metadata.

use crate::{Result, data_source::Record};

pub mod aggregate;
pub mod graph;
pub mod labeler;
pub mod metadata;
pub mod reducer;
pub mod sequence;
pub mod token;

// Re-export key types
pub use aggregate::AggregatedEdge;
pub use graph::{GraphStats, PathwayEdge, PathwayGraph, PathwayNode};
pub use labeler::{DEFAULT_BUCKET_UNITS, MAX_BUCKET, StudentTimeline};
pub use metadata::{MetadataTable, StateMetadata};
pub use sequence::{GapWarning, TransitionRecord};
pub use token::{NodeKey, NodeState, StateToken};

/// Pipeline settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub bucket_units: u32,

    /// Last bucket to reach; `None` uses the largest observed bucket
    pub time_max: Option<u32>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            bucket_units: DEFAULT_BUCKET_UNITS,
            time_max: None,
        }
    }
}

impl PipelineOptions {
    pub fn time_max(mut self, time_max: u32) -> Self {
        self.time_max = Some(time_max);
        self
    }
}

/// Everything one pipeline run produces
pub struct PathwayRun {
    pub graph: PathwayGraph,
    pub transitions: Vec<TransitionRecord>,
    pub warnings: Vec<GapWarning>,
}

/// Build the pathway graph from loaded records
pub fn build_pathway_graph(
    records: &[Record],
    options: &PipelineOptions,
    table: &MetadataTable,
) -> Result<PathwayRun> {
    if let Some(time_max) = options.time_max {
        crate::ensure!(
            time_max <= labeler::MAX_BUCKET,
            "time_max {} is past the last supported bucket {}",
            time_max,
            labeler::MAX_BUCKET
        );
    }
    let timelines = labeler::build_timelines(records, options.bucket_units)?;
    let synthesis = sequence::synthesize(timelines, options.time_max);
    let edges = aggregate::aggregate(&synthesis.transitions);
    let graph = PathwayGraph::assemble(&edges, table)?;

    Ok(PathwayRun {
        graph,
        transitions: synthesis.transitions,
        warnings: synthesis.warnings,
    })
}
