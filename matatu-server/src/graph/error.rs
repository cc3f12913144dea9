//! Graph construction errors.
//!
//! These represent a snapshot that violates the graph invariants. A graph
//! that constructs successfully can be trusted by every reader.

use super::NodeIndex;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Reading the snapshot file failed
    #[error("failed to read graph snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot JSON was malformed
    #[error("failed to parse graph snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Node indices must be exactly `0..n`
    #[error("node indices must be contiguous: expected {expected}, found {found}")]
    NonContiguousNodes { expected: NodeIndex, found: NodeIndex },

    /// Two stops share a `stop_id`
    #[error("duplicate stop_id: {0}")]
    DuplicateStopId(String),

    /// Edge references a node that does not exist
    #[error("edge {edge} references unknown node {node}")]
    DanglingEndpoint { edge: usize, node: NodeIndex },

    /// Only transfer edges may start and end at the same node
    #[error("edge {edge} is a self-loop but is not a transfer edge")]
    IllegalSelfLoop { edge: usize },

    /// Costs must be finite and non-negative
    #[error("edge {edge} has an invalid cost {cost}")]
    InvalidCost { edge: usize, cost: f64 },

    /// `hop_count` must be at least 1
    #[error("edge {edge} has a zero hop count")]
    ZeroHopCount { edge: usize },
}
