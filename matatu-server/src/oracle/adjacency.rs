//! Outgoing-arc lists derived from the edge table.

use crate::graph::{Edge, EdgeId, NodeIndex};

/// One traversable direction of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    pub edge: EdgeId,
    pub to: NodeIndex,
    /// True when the edge is walked target to source at `reverse_cost`.
    pub reversed: bool,
}

/// Outgoing arcs per node, each list in ascending edge-id order.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    out: Vec<Vec<Arc>>,
}

impl Adjacency {
    /// Build arcs for `node_count` nodes from the edge table.
    ///
    /// Edges whose endpoints fall outside `0..node_count` are ignored.
    pub fn build(node_count: usize, edges: &[Edge]) -> Self {
        let mut out = vec![Vec::new(); node_count];

        for (i, edge) in edges.iter().enumerate() {
            if edge.source.0 >= node_count || edge.target.0 >= node_count {
                continue;
            }
            if edge.direction.allows_forward() {
                out[edge.source.0].push(Arc {
                    edge: EdgeId(i),
                    to: edge.target,
                    reversed: false,
                });
            }
            if edge.direction.allows_reverse() {
                out[edge.target.0].push(Arc {
                    edge: EdgeId(i),
                    to: edge.source,
                    reversed: true,
                });
            }
        }

        Self { out }
    }

    /// Arcs leaving `node` (empty for unknown nodes).
    pub fn arcs(&self, node: NodeIndex) -> &[Arc] {
        self.out.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.out.len()
    }
}
