//! Raw path output of one shortest-path query.

use crate::graph::{EdgeId, NodeIndex};

/// The edge recorded on a trace row.
///
/// Rows follow the pgRouting convention: each row names the edge used to
/// leave its node, so the final row has no real edge and carries the
/// virtual closing edge instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEdge {
    Edge(EdgeId),
    Closing,
}

impl TraceEdge {
    /// The wire-level edge id (`-1` for the closing edge).
    pub fn id(&self) -> i64 {
        match self {
            TraceEdge::Edge(id) => id.0 as i64,
            TraceEdge::Closing => -1,
        }
    }

    pub fn is_closing(&self) -> bool {
        matches!(self, TraceEdge::Closing)
    }

    pub fn edge_id(&self) -> Option<EdgeId> {
        match self {
            TraceEdge::Edge(id) => Some(*id),
            TraceEdge::Closing => None,
        }
    }
}

/// One row of a path trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub node: NodeIndex,
    pub edge: TraceEdge,
    /// Cost of `edge` under the query's cost view (0 for the closing edge).
    pub step_cost: f64,
    /// Cost accumulated before leaving `node`.
    pub aggregate_cost: f64,
}

/// Ordered node/edge sequence from source to target with cumulative cost.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathTrace {
    pub steps: Vec<TraceStep>,
}

impl PathTrace {
    pub fn new(steps: Vec<TraceStep>) -> Self {
        Self { steps }
    }

    /// Build a trace from a node sequence and the edges joining it.
    ///
    /// `edges[i]` leaves `nodes[i]` with cost `costs[i]`; the last node gets
    /// the closing edge.
    pub fn from_parts(nodes: &[NodeIndex], edges: &[EdgeId], costs: &[f64]) -> Self {
        let mut steps = Vec::with_capacity(nodes.len());
        let mut aggregate = 0.0;
        for (i, node) in nodes.iter().enumerate() {
            match (edges.get(i), costs.get(i)) {
                (Some(edge), Some(cost)) => {
                    steps.push(TraceStep {
                        node: *node,
                        edge: TraceEdge::Edge(*edge),
                        step_cost: *cost,
                        aggregate_cost: aggregate,
                    });
                    aggregate += cost;
                }
                _ => steps.push(TraceStep {
                    node: *node,
                    edge: TraceEdge::Closing,
                    step_cost: 0.0,
                    aggregate_cost: aggregate,
                }),
            }
        }
        Self { steps }
    }

    /// Total cost of the path (aggregate cost at the final row).
    pub fn total_cost(&self) -> f64 {
        self.steps.last().map(|s| s.aggregate_cost).unwrap_or(0.0)
    }

    pub fn nodes(&self) -> Vec<NodeIndex> {
        self.steps.iter().map(|s| s.node).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
