//! Itinerary ranking for search results.
//!
//! Transfer count dominates: a direct ride always ranks above a ride with
//! a change, whatever the scores.

use std::collections::HashSet;

use super::itinerary::Itinerary;

/// Rank itineraries by preference.
///
/// Itineraries are ranked by:
/// 1. Number of transfers (fewer is better)
/// 2. Score (lower is better)
///
/// The sort is stable, so equal itineraries keep their input order.
pub fn rank_itineraries(mut itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    itineraries.sort_by(|a, b| {
        a.transfer_count
            .cmp(&b.transfer_count)
            .then_with(|| a.score.total_cmp(&b.score))
    });
    itineraries
}

/// Rank itineraries by transfers, then raw transit cost.
pub fn rank_by_transit_cost(mut itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    itineraries.sort_by(|a, b| {
        a.transfer_count
            .cmp(&b.transfer_count)
            .then_with(|| a.transit_cost.total_cmp(&b.transit_cost))
    });
    itineraries
}

/// Collapse itineraries with the same `(route_id, board, alight)` segments.
///
/// Keeps the first of each group, so deduplicating a ranked list keeps the
/// best-ranked copy.
pub fn deduplicate(itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    let mut seen = HashSet::new();
    itineraries
        .into_iter()
        .filter(|it| seen.insert(it.route_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::itinerary::fixtures::{itinerary, segment};

    #[test]
    fn rank_by_transfers_before_score() {
        let direct_expensive = itinerary(vec![segment("R1", &["A", "B"], &[])], 2000.0, 0.0);
        let change_cheap = itinerary(
            vec![
                segment("R1", &["A", "C"], &[]),
                segment("R2", &["C", "B"], &[]),
            ],
            1.0,
            0.0,
        );
        assert!(change_cheap.score < direct_expensive.score);

        let ranked = rank_itineraries(vec![change_cheap, direct_expensive]);

        assert_eq!(ranked[0].transfer_count, 0);
        assert_eq!(ranked[1].transfer_count, 1);
    }

    #[test]
    fn rank_by_score_when_same_transfers() {
        let a = itinerary(vec![segment("R1", &["A", "B"], &[])], 40.0, 0.0);
        let b = itinerary(vec![segment("R2", &["A", "B"], &[])], 20.0, 0.0);

        let ranked = rank_itineraries(vec![a, b]);
        assert_eq!(ranked[0].segments[0].route_id, "R2");
    }

    #[test]
    fn rank_by_transit_cost_ignores_walking() {
        let near = itinerary(vec![segment("R1", &["A", "B"], &[])], 40.0, 0.0);
        let far = itinerary(vec![segment("R2", &["A", "B"], &[])], 30.0, 4000.0);

        let ranked = rank_by_transit_cost(vec![near.clone(), far.clone()]);
        assert_eq!(ranked[0].segments[0].route_id, "R2");

        let ranked = rank_itineraries(vec![near, far]);
        assert_eq!(ranked[0].segments[0].route_id, "R1");
    }

    #[test]
    fn deduplicate_same_segments() {
        let a = itinerary(vec![segment("R1", &["A", "X", "B"], &[])], 10.0, 0.0);
        let b = itinerary(vec![segment("R1", &["A", "Y", "B"], &[])], 12.0, 300.0);
        let c = itinerary(vec![segment("R1", &["A", "C"], &[])], 10.0, 0.0);

        let result = deduplicate(vec![a, b, c]);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].transit_cost, 10.0);
        assert_eq!(result[1].segments[0].alight_stop, "C");
    }

    #[test]
    fn empty_input() {
        assert!(rank_itineraries(vec![]).is_empty());
        assert!(rank_by_transit_cost(vec![]).is_empty());
        assert!(deduplicate(vec![]).is_empty());
    }
}
