//! Derived transfer and walking edges.
//!
//! Snapshots produced from raw timetables only carry ridden edges. These
//! helpers add the same-stop transfer pivots and short walking links the
//! planner expects to find.

use std::collections::HashSet;

use crate::planner::{Classifier, HubTier};

use super::transit::distinct_route_counts;
use super::{Direction, Edge, EdgeType, NodeIndex, Stop, haversine_m};

const MAJOR_HUB_TRANSFER_COST: f64 = 8.0;
const MINOR_HUB_TRANSFER_COST: f64 = 12.0;
const STOP_TRANSFER_COST: f64 = 18.0;

/// Walking links are only made between stops this far apart (metres).
const WALK_MIN_M: f64 = 100.0;
const WALK_MAX_M: f64 = 600.0;

/// Cost of changing routes at a stop served by `route_count` routes.
///
/// Stops with a single route have nothing to transfer to.
pub fn transfer_cost(classifier: &Classifier, route_count: usize) -> Option<f64> {
    if route_count <= 1 {
        return None;
    }
    Some(match classifier.tier_for_routes(route_count) {
        HubTier::Major => MAJOR_HUB_TRANSFER_COST,
        HubTier::Minor => MINOR_HUB_TRANSFER_COST,
        HubTier::None => STOP_TRANSFER_COST,
    })
}

/// One transfer self-loop per stop served by more than one route.
pub fn transfer_edges(stops: &[Stop], edges: &[Edge], classifier: &Classifier) -> Vec<Edge> {
    let counts = distinct_route_counts(stops.len(), edges);

    counts
        .iter()
        .enumerate()
        .filter_map(|(i, &count)| {
            let cost = transfer_cost(classifier, count)?;
            let node = NodeIndex(i);
            Some(Edge::new(node, node, cost, EdgeType::Transfer))
        })
        .collect()
}

/// Walking cost over `distance_m`, cheaper when inside the CBD.
pub fn walking_cost(distance_m: f64, in_cbd: bool) -> f64 {
    if in_cbd {
        distance_m / 100.0 + 10.0
    } else {
        distance_m / 80.0 + 30.0
    }
}

/// Two-way walking edges between stops 100 to 600 m apart.
///
/// Inside the CBD (both stops CBD-adjacent) every such pair is linked.
/// Elsewhere a pair is only linked when no routed edge already joins it.
pub fn walking_edges(stops: &[Stop], edges: &[Edge], classifier: &Classifier) -> Vec<Edge> {
    let routed: HashSet<(NodeIndex, NodeIndex)> = edges
        .iter()
        .filter(|e| e.route_id.is_some() && e.edge_type != EdgeType::Walking)
        .map(|e| ordered(e.source, e.target))
        .collect();
    let adjacent: Vec<bool> = stops.iter().map(|s| classifier.is_cbd_adjacent(s)).collect();

    let mut walks = Vec::new();
    for (i, a) in stops.iter().enumerate() {
        for (j, b) in stops.iter().enumerate().skip(i + 1) {
            let distance = haversine_m(a.lat, a.lon, b.lat, b.lon);
            if !(WALK_MIN_M..=WALK_MAX_M).contains(&distance) {
                continue;
            }

            let in_cbd = adjacent[i] && adjacent[j];
            if !in_cbd && routed.contains(&ordered(a.node_index, b.node_index)) {
                continue;
            }

            walks.push(
                Edge::new(
                    a.node_index,
                    b.node_index,
                    walking_cost(distance, in_cbd),
                    EdgeType::Walking,
                )
                .with_direction(Direction::Both),
            );
        }
    }
    walks
}

fn ordered(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a <= b { (a, b) } else { (b, a) }
}
