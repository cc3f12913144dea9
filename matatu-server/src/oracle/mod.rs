//! Shortest-path oracle.
//!
//! Reference implementation of the path-search capability the planner
//! consumes through [`GraphView`](crate::graph::GraphView): single-pair
//! Dijkstra and Yen's k-shortest paths over a per-query [`CostView`].
//!
//! Failures are per pair. An unreachable target or an unknown node is a
//! [`PairError`], never a panic, so the orchestrator can drop the pair
//! and carry on with its siblings.

mod adjacency;
mod dijkstra;
mod trace;
mod yen;

pub use adjacency::{Adjacency, Arc};
pub use trace::{PathTrace, TraceEdge, TraceStep};

use crate::graph::NodeIndex;
use crate::planner::CostView;

/// Failure of one origin/destination pair query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PairError {
    /// Target is unreachable from the source under this cost view
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeIndex, to: NodeIndex },

    /// Node handle is not part of the graph
    #[error("unknown node {0}")]
    UnknownNode(NodeIndex),

    /// Every edge was filtered out of the cost view
    #[error("cost view has no usable edges")]
    NoUsableEdges,

    /// Pair task did not complete (panicked or was cancelled)
    #[error("pair evaluation aborted: {0}")]
    Aborted(String),
}

fn check_pair(
    adjacency: &Adjacency,
    view: &CostView,
    source: NodeIndex,
    target: NodeIndex,
) -> Result<(), PairError> {
    for node in [source, target] {
        if node.0 >= adjacency.node_count() {
            return Err(PairError::UnknownNode(node));
        }
    }
    if view.usable_edges() == 0 {
        return Err(PairError::NoUsableEdges);
    }
    Ok(())
}

/// Cheapest path from `source` to `target`.
pub fn shortest_path(
    adjacency: &Adjacency,
    view: &CostView,
    source: NodeIndex,
    target: NodeIndex,
) -> Result<PathTrace, PairError> {
    check_pair(adjacency, view, source, target)?;

    dijkstra::dijkstra(adjacency, view, source, target, &dijkstra::Bans::default())
        .map(|p| PathTrace::from_parts(&p.nodes, &p.edges, &p.costs))
        .ok_or(PairError::NoPath {
            from: source,
            to: target,
        })
}

/// Up to `k` loopless paths from `source` to `target`, cheapest first.
pub fn k_shortest_paths(
    adjacency: &Adjacency,
    view: &CostView,
    source: NodeIndex,
    target: NodeIndex,
    k: usize,
) -> Result<Vec<PathTrace>, PairError> {
    check_pair(adjacency, view, source, target)?;

    let paths = yen::k_shortest(adjacency, view, source, target, k);
    if paths.is_empty() {
        return Err(PairError::NoPath {
            from: source,
            to: target,
        });
    }

    Ok(paths
        .iter()
        .map(|p| PathTrace::from_parts(&p.nodes, &p.edges, &p.costs))
        .collect())
}
