//! Yen's loopless k-shortest paths.

use crate::graph::NodeIndex;
use crate::planner::CostView;

use super::adjacency::Adjacency;
use super::dijkstra::{Bans, RawPath, dijkstra};

/// Up to `k` loopless paths ranked by ascending total cost.
///
/// Ties are broken by node sequence, then edge sequence, so the output is
/// deterministic for a fixed graph and cost view.
pub(super) fn k_shortest(
    adjacency: &Adjacency,
    view: &CostView,
    source: NodeIndex,
    target: NodeIndex,
    k: usize,
) -> Vec<RawPath> {
    let mut accepted: Vec<RawPath> = Vec::new();
    if k == 0 {
        return accepted;
    }

    let Some(first) = dijkstra(adjacency, view, source, target, &Bans::default()) else {
        return accepted;
    };
    accepted.push(first);

    let mut candidates: Vec<RawPath> = Vec::new();

    while accepted.len() < k {
        let previous = accepted[accepted.len() - 1].clone();

        for spur_idx in 0..previous.nodes.len() - 1 {
            let spur_node = previous.nodes[spur_idx];
            let root_nodes = &previous.nodes[..=spur_idx];
            let root_edges = &previous.edges[..spur_idx];

            let mut bans = Bans::default();

            // Remove the next edge of every accepted path sharing this root
            for path in &accepted {
                if path.nodes.len() > spur_idx + 1
                    && path.nodes[..=spur_idx] == *root_nodes
                    && path.edges[..spur_idx] == *root_edges
                {
                    bans.edges.insert(path.edges[spur_idx]);
                }
            }

            // Root nodes other than the spur node may not be revisited
            for node in &root_nodes[..spur_idx] {
                bans.nodes.insert(*node);
            }

            let Some(spur) = dijkstra(adjacency, view, spur_node, target, &bans) else {
                continue;
            };

            let mut nodes = root_nodes.to_vec();
            nodes.extend_from_slice(&spur.nodes[1..]);
            let mut edges = root_edges.to_vec();
            edges.extend_from_slice(&spur.edges);
            let mut costs = previous.costs[..spur_idx].to_vec();
            costs.extend_from_slice(&spur.costs);

            let candidate = RawPath {
                nodes,
                edges,
                costs,
            };

            if !accepted.contains(&candidate) && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }

        if candidates.is_empty() {
            break;
        }

        candidates.sort_by(|a, b| {
            a.total_cost()
                .total_cmp(&b.total_cost())
                .then_with(|| a.nodes.cmp(&b.nodes))
                .then_with(|| a.edges.cmp(&b.edges))
        });
        accepted.push(candidates.remove(0));
    }

    accepted
}
