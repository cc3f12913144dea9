//! Per-query edge cost view.
//!
//! A [`CostView`] re-weights the graph's base costs for one query without
//! touching the graph itself. The rules are applied in a fixed priority
//! order; the first matching rule decides the weight:
//!
//! 1. `direct` edges
//! 2. CBD-adjacent `multi_hop` and `transfer` edges
//! 3. `multi_hop` edges banded by hop count
//! 4. flat penalties on `transfer` and `walking` edges
//! 5. everything else
//!
//! Edges whose base cost is not a positive finite number are filtered out.

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, EdgeId, EdgeType, GraphView};

use super::classify::Classifier;

/// Named constants of the cost view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostPolicy {
    pub direct_multiplier: f64,
    pub cbd_multihop_multiplier: f64,
    pub cbd_transfer_multiplier: f64,
    pub multihop_short_multiplier: f64,
    pub multihop_long_multiplier: f64,
    /// Largest hop count still banded as a short multi-hop.
    pub multihop_short_max_hops: u32,
    pub transfer_flat_penalty: f64,
    pub walking_flat_penalty: f64,
    pub default_multiplier: f64,
}

impl Default for CostPolicy {
    fn default() -> Self {
        Self {
            direct_multiplier: 0.7,
            cbd_multihop_multiplier: 0.6,
            cbd_transfer_multiplier: 0.8,
            multihop_short_multiplier: 1.0,
            multihop_long_multiplier: 1.4,
            multihop_short_max_hops: 3,
            transfer_flat_penalty: 25.0,
            walking_flat_penalty: 15.0,
            default_multiplier: 1.5,
        }
    }
}

impl CostPolicy {
    /// Weight of traversing `edge` at `base` cost.
    ///
    /// Returns `None` when the edge is not usable at that cost.
    pub fn weigh(&self, edge: &Edge, base: f64, cbd_adjacent: bool) -> Option<f64> {
        if !base.is_finite() || base <= 0.0 {
            return None;
        }

        let weight = match edge.edge_type {
            EdgeType::Direct => base * self.direct_multiplier,
            EdgeType::MultiHop if cbd_adjacent => base * self.cbd_multihop_multiplier,
            EdgeType::Transfer if cbd_adjacent => base * self.cbd_transfer_multiplier,
            EdgeType::MultiHop if edge.hop_count <= self.multihop_short_max_hops => {
                base * self.multihop_short_multiplier
            }
            EdgeType::MultiHop => base * self.multihop_long_multiplier,
            EdgeType::Transfer => base + self.transfer_flat_penalty,
            EdgeType::Walking => base + self.walking_flat_penalty,
            EdgeType::Destination => base * self.default_multiplier,
        };

        Some(weight)
    }
}

/// Query-specific costs for every edge, indexed by edge id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostView {
    costs: Vec<Option<f64>>,
    reverse_costs: Vec<Option<f64>>,
}

impl CostView {
    /// Derive the cost view of `graph` under `policy`.
    ///
    /// An edge is CBD-adjacent when either endpoint is. An edge with a
    /// filtered forward cost is filtered in both directions.
    pub fn build<G: GraphView + ?Sized>(
        graph: &G,
        policy: &CostPolicy,
        classifier: &Classifier,
    ) -> Self {
        let adjacent: Vec<bool> = graph
            .stops()
            .iter()
            .map(|s| classifier.is_cbd_adjacent(s))
            .collect();
        let is_adjacent = |i: usize| adjacent.get(i).copied().unwrap_or(false);

        let edges = graph.edges();
        let mut costs = Vec::with_capacity(edges.len());
        let mut reverse_costs = Vec::with_capacity(edges.len());

        for edge in edges {
            let cbd = is_adjacent(edge.source.0) || is_adjacent(edge.target.0);
            let forward = policy.weigh(edge, edge.cost, cbd);
            let reverse = forward.and_then(|_| policy.weigh(edge, edge.reverse_cost, cbd));
            costs.push(forward);
            reverse_costs.push(reverse);
        }

        Self {
            costs,
            reverse_costs,
        }
    }

    /// Build a view from precomputed costs.
    pub fn from_costs(costs: Vec<Option<f64>>, reverse_costs: Vec<Option<f64>>) -> Self {
        Self {
            costs,
            reverse_costs,
        }
    }

    /// Cost of traversing `edge`, in reverse when `reversed`.
    pub fn cost_of(&self, edge: EdgeId, reversed: bool) -> Option<f64> {
        let table = if reversed {
            &self.reverse_costs
        } else {
            &self.costs
        };
        table.get(edge.0).copied().flatten()
    }

    /// Number of edges with a usable forward cost.
    pub fn usable_edges(&self) -> usize {
        self.costs.iter().filter(|c| c.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphBuilder, NodeIndex, Stop};

    // Kencom sits inside the CBD radius, Kangemi is ~8 km out
    fn graph() -> crate::graph::TransitGraph {
        GraphBuilder::new()
            .stop(Stop::new("KEN", NodeIndex(0), "Kencom", -1.2864, 36.8250))
            .stop(Stop::new("WEST", NodeIndex(1), "Westlands", -1.2676, 36.8108))
            .stop(Stop::new("KAN", NodeIndex(2), "Kangemi", -1.2697, 36.7482))
            .stop(Stop::new("UTH", NodeIndex(3), "Uthiru", -1.2640, 36.7160))
            .edge(Edge::new(NodeIndex(2), NodeIndex(3), 10.0, EdgeType::Direct).on_route("R1"))
            .edge(
                Edge::new(NodeIndex(0), NodeIndex(2), 10.0, EdgeType::MultiHop)
                    .on_route("R1")
                    .with_hops(6),
            )
            .edge(
                Edge::new(NodeIndex(2), NodeIndex(3), 10.0, EdgeType::MultiHop)
                    .on_route("R1")
                    .with_hops(2),
            )
            .edge(
                Edge::new(NodeIndex(2), NodeIndex(3), 10.0, EdgeType::MultiHop)
                    .on_route("R1")
                    .with_hops(4),
            )
            .edge(Edge::new(NodeIndex(0), NodeIndex(0), 10.0, EdgeType::Transfer))
            .edge(Edge::new(NodeIndex(2), NodeIndex(2), 10.0, EdgeType::Transfer))
            .edge(Edge::new(NodeIndex(2), NodeIndex(3), 10.0, EdgeType::Walking))
            .edge(Edge::new(NodeIndex(2), NodeIndex(3), 10.0, EdgeType::Destination))
            .edge(Edge::new(NodeIndex(2), NodeIndex(3), 0.0, EdgeType::Direct))
            .build()
            .unwrap()
    }

    fn view() -> CostView {
        CostView::build(&graph(), &CostPolicy::default(), &Classifier::default())
    }

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap();
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn rules_apply_in_priority_order() {
        let view = view();

        approx(view.cost_of(EdgeId(0), false), 7.0); // direct
        approx(view.cost_of(EdgeId(1), false), 6.0); // CBD multi-hop beats hop banding
        approx(view.cost_of(EdgeId(2), false), 10.0); // short multi-hop
        approx(view.cost_of(EdgeId(3), false), 14.0); // long multi-hop
        approx(view.cost_of(EdgeId(4), false), 8.0); // CBD transfer
        approx(view.cost_of(EdgeId(5), false), 35.0); // transfer penalty
        approx(view.cost_of(EdgeId(6), false), 25.0); // walking penalty
        approx(view.cost_of(EdgeId(7), false), 15.0); // default
    }

    #[test]
    fn non_positive_costs_are_filtered() {
        let view = view();
        assert_eq!(view.cost_of(EdgeId(8), false), None);
        assert_eq!(view.cost_of(EdgeId(8), true), None);
        assert_eq!(view.usable_edges(), 8);
        assert_eq!(view.len(), 9);
    }

    #[test]
    fn unknown_edge_has_no_cost() {
        assert_eq!(view().cost_of(EdgeId(99), false), None);
    }

    #[test]
    fn reverse_cost_follows_same_rules() {
        let graph = GraphBuilder::new()
            .stop(Stop::new("A", NodeIndex(0), "Kangemi", -1.2697, 36.7482))
            .stop(Stop::new("B", NodeIndex(1), "Uthiru", -1.2640, 36.7160))
            .edge(Edge::new(NodeIndex(0), NodeIndex(1), 10.0, EdgeType::Direct).with_reverse_cost(20.0))
            .edge(Edge::new(NodeIndex(0), NodeIndex(1), 10.0, EdgeType::Direct).with_reverse_cost(0.0))
            .build()
            .unwrap();
        let view = CostView::build(&graph, &CostPolicy::default(), &Classifier::default());

        approx(view.cost_of(EdgeId(0), true), 14.0);
        assert_eq!(view.cost_of(EdgeId(1), true), None);
        approx(view.cost_of(EdgeId(1), false), 7.0);
    }

    #[test]
    fn building_does_not_mutate_graph() {
        let graph = graph();
        let before = graph.edges().to_vec();
        let _ = CostView::build(&graph, &CostPolicy::default(), &Classifier::default());
        assert_eq!(graph.edges(), before.as_slice());
    }
}
