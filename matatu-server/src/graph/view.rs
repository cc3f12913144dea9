//! Read interface of the transit graph.

use std::collections::{BTreeSet, HashMap};

use crate::oracle::{PairError, PathTrace};
use crate::planner::CostView;

use super::{Edge, EdgeId, NodeIndex, Stop};

/// A stop near a query coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStop {
    pub stop: Stop,
    pub distance_m: f64,
}

/// Read-only view of an immutable transit graph.
///
/// The planner only ever reads through this trait, so a graph can be
/// shared by every concurrent request. Implementations must keep
/// `stops()[i].node_index == NodeIndex(i)`.
pub trait GraphView: Send + Sync {
    /// All stops, indexed by node index.
    fn stops(&self) -> &[Stop];

    /// All edges, indexed by edge id.
    fn edges(&self) -> &[Edge];

    fn stop(&self, node: NodeIndex) -> Option<&Stop> {
        self.stops().get(node.0)
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges().get(id.0)
    }

    /// Stops within `radius_m` of a coordinate, closest first, at most
    /// `limit` of them.
    ///
    /// Equal distances are ordered by node index.
    fn nearby_stops(&self, lat: f64, lon: f64, radius_m: f64, limit: usize) -> Vec<NearbyStop> {
        let mut nearby: Vec<NearbyStop> = self
            .stops()
            .iter()
            .filter_map(|stop| {
                let distance_m = stop.distance_to(lat, lon);
                (distance_m <= radius_m).then(|| NearbyStop {
                    stop: stop.clone(),
                    distance_m,
                })
            })
            .collect();

        nearby.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.stop.node_index.cmp(&b.stop.node_index))
        });
        nearby.truncate(limit);
        nearby
    }

    /// First stop, in node order, whose name contains `fragment`
    /// case-insensitively.
    fn stop_by_name(&self, fragment: &str) -> Option<&Stop> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.stops()
            .iter()
            .find(|stop| stop.name.to_lowercase().contains(&needle))
    }

    /// Distinct routes on edges touching `node`.
    fn incident_route_count(&self, node: NodeIndex) -> usize;

    /// Cheapest path between two stops under a cost view.
    fn shortest_path(
        &self,
        view: &CostView,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Result<PathTrace, PairError>;

    /// Up to `k` loopless paths, cheapest first.
    fn k_shortest_paths(
        &self,
        view: &CostView,
        source: NodeIndex,
        target: NodeIndex,
        k: usize,
    ) -> Result<Vec<PathTrace>, PairError>;

    /// Display names for the given routes.
    ///
    /// Routes without a known name are left out of the map.
    fn route_labels(&self, route_ids: &BTreeSet<String>) -> HashMap<String, String>;
}
