//! In-memory transit graph.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::oracle::{self, Adjacency, PairError, PathTrace};
use crate::planner::{Classifier, CostView};

use super::error::GraphError;
use super::synthesis;
use super::view::GraphView;
use super::{Edge, EdgeType, NodeIndex, Stop};

/// Distinct route ids on edges touching each node.
pub(crate) fn distinct_route_counts(node_count: usize, edges: &[Edge]) -> Vec<usize> {
    let mut routes: Vec<HashSet<&str>> = vec![HashSet::new(); node_count];
    for edge in edges {
        let Some(route_id) = edge.route_id.as_deref() else {
            continue;
        };
        for node in [edge.source, edge.target] {
            if let Some(set) = routes.get_mut(node.0) {
                set.insert(route_id);
            }
        }
    }
    routes.iter().map(HashSet::len).collect()
}

/// Builder for a [`TransitGraph`].
///
/// Stops may be added in any order; `build` sorts them by node index and
/// checks the graph invariants.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    stops: Vec<Stop>,
    edges: Vec<Edge>,
    labels: HashMap<String, String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(mut self, stop: Stop) -> Self {
        self.stops.push(stop);
        self
    }

    pub fn stops(mut self, stops: impl IntoIterator<Item = Stop>) -> Self {
        self.stops.extend(stops);
        self
    }

    pub fn edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn edges(mut self, edges: impl IntoIterator<Item = Edge>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Display label for a route.
    pub fn route(mut self, route_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(route_id.into(), label.into());
        self
    }

    /// Append same-stop transfer edges at every multi-route stop.
    pub fn with_transfer_edges(mut self, classifier: &Classifier) -> Self {
        self.stops.sort_by_key(|s| s.node_index);
        let extra = synthesis::transfer_edges(&self.stops, &self.edges, classifier);
        debug!(count = extra.len(), "Synthesized transfer edges");
        self.edges.extend(extra);
        self
    }

    /// Append walking edges between nearby stops.
    pub fn with_walking_edges(mut self, classifier: &Classifier) -> Self {
        self.stops.sort_by_key(|s| s.node_index);
        let extra = synthesis::walking_edges(&self.stops, &self.edges, classifier);
        debug!(count = extra.len(), "Synthesized walking edges");
        self.edges.extend(extra);
        self
    }

    /// Validate and build the graph.
    pub fn build(mut self) -> Result<TransitGraph, GraphError> {
        self.stops.sort_by_key(|s| s.node_index);

        let mut stop_ids = HashSet::with_capacity(self.stops.len());
        for (i, stop) in self.stops.iter().enumerate() {
            if stop.node_index != NodeIndex(i) {
                return Err(GraphError::NonContiguousNodes {
                    expected: NodeIndex(i),
                    found: stop.node_index,
                });
            }
            if !stop_ids.insert(stop.stop_id.as_str()) {
                return Err(GraphError::DuplicateStopId(stop.stop_id.clone()));
            }
        }

        let n = self.stops.len();
        for (i, edge) in self.edges.iter().enumerate() {
            for node in [edge.source, edge.target] {
                if node.0 >= n {
                    return Err(GraphError::DanglingEndpoint { edge: i, node });
                }
            }
            if edge.is_self_loop() && edge.edge_type != EdgeType::Transfer {
                return Err(GraphError::IllegalSelfLoop { edge: i });
            }
            for cost in [edge.cost, edge.reverse_cost] {
                if !cost.is_finite() || cost < 0.0 {
                    return Err(GraphError::InvalidCost { edge: i, cost });
                }
            }
            if edge.hop_count == 0 {
                return Err(GraphError::ZeroHopCount { edge: i });
            }
        }

        Ok(self.build_unchecked())
    }

    /// Build without validating. Callers must uphold the invariants.
    pub(crate) fn build_unchecked(mut self) -> TransitGraph {
        self.stops.sort_by_key(|s| s.node_index);
        let adjacency = Adjacency::build(self.stops.len(), &self.edges);
        let route_counts = distinct_route_counts(self.stops.len(), &self.edges);

        TransitGraph {
            stops: self.stops,
            edges: self.edges,
            adjacency,
            route_counts,
            labels: self.labels,
        }
    }
}

/// Immutable transit multigraph with its reference shortest-path oracle.
#[derive(Debug, Clone)]
pub struct TransitGraph {
    stops: Vec<Stop>,
    edges: Vec<Edge>,
    adjacency: Adjacency,
    route_counts: Vec<usize>,
    labels: HashMap<String, String>,
}

impl TransitGraph {
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of routes with a display label.
    pub fn route_count(&self) -> usize {
        self.labels.len()
    }
}

impl GraphView for TransitGraph {
    fn stops(&self) -> &[Stop] {
        &self.stops
    }

    fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn incident_route_count(&self, node: NodeIndex) -> usize {
        self.route_counts.get(node.0).copied().unwrap_or(0)
    }

    fn shortest_path(
        &self,
        view: &CostView,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Result<PathTrace, PairError> {
        oracle::shortest_path(&self.adjacency, view, source, target)
    }

    fn k_shortest_paths(
        &self,
        view: &CostView,
        source: NodeIndex,
        target: NodeIndex,
        k: usize,
    ) -> Result<Vec<PathTrace>, PairError> {
        oracle::k_shortest_paths(&self.adjacency, view, source, target, k)
    }

    fn route_labels(&self, route_ids: &BTreeSet<String>) -> HashMap<String, String> {
        route_ids
            .iter()
            .filter_map(|id| self.labels.get(id).map(|label| (id.clone(), label.clone())))
            .collect()
    }
}
