use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::graph::{EdgeId, NodeIndex};
use crate::planner::CostView;

use super::adjacency::Adjacency;

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl Eq for State {}

// Min-heap by cost, lower node index first on equal cost
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A path as parallel node/edge/cost sequences.
///
/// `edges[i]` leaves `nodes[i]` with cost `costs[i]`, so
/// `edges.len() == nodes.len() - 1`.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RawPath {
    pub(super) nodes: Vec<NodeIndex>,
    pub(super) edges: Vec<EdgeId>,
    pub(super) costs: Vec<f64>,
}

impl RawPath {
    pub(super) fn total_cost(&self) -> f64 {
        self.costs.iter().sum()
    }
}

/// Edges and nodes the search may not use.
#[derive(Debug, Default)]
pub(super) struct Bans {
    pub(super) edges: HashSet<EdgeId>,
    pub(super) nodes: HashSet<NodeIndex>,
}

/// Single-source single-target Dijkstra over a cost view.
///
/// Relaxation happens only on strict improvement and arcs are scanned in
/// edge-id order, so among equal-cost paths the one found through earlier
/// edges is kept. Returns `None` when `target` is unreachable.
pub(super) fn dijkstra(
    adjacency: &Adjacency,
    view: &CostView,
    source: NodeIndex,
    target: NodeIndex,
    bans: &Bans,
) -> Option<RawPath> {
    let n = adjacency.node_count();
    if source.0 >= n || target.0 >= n {
        return None;
    }

    let mut distances = vec![f64::INFINITY; n];
    let mut predecessors: Vec<Option<(NodeIndex, EdgeId, f64)>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    distances[source.0] = 0.0;
    heap.push(State {
        cost: 0.0,
        node: source,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            break;
        }

        // Skip if we've found a better path
        if cost > distances[node.0] {
            continue;
        }

        for arc in adjacency.arcs(node) {
            if bans.edges.contains(&arc.edge) || bans.nodes.contains(&arc.to) {
                continue;
            }
            let Some(weight) = view.cost_of(arc.edge, arc.reversed) else {
                continue;
            };

            let next_cost = cost + weight;
            if next_cost < distances[arc.to.0] {
                distances[arc.to.0] = next_cost;
                predecessors[arc.to.0] = Some((node, arc.edge, weight));
                heap.push(State {
                    cost: next_cost,
                    node: arc.to,
                });
            }
        }
    }

    if source == target || !distances[target.0].is_finite() {
        return None;
    }

    let mut nodes = vec![target];
    let mut edges = Vec::new();
    let mut costs = Vec::new();
    let mut current = target;
    while current != source {
        let (prev, edge, weight) = predecessors[current.0]?;
        nodes.push(prev);
        edges.push(edge);
        costs.push(weight);
        current = prev;
    }
    nodes.reverse();
    edges.reverse();
    costs.reverse();

    Some(RawPath {
        nodes,
        edges,
        costs,
    })
}
