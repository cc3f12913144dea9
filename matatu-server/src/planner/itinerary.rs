//! Scored itinerary candidates.

use crate::graph::Stop;

use super::assemble::Segment;
use super::score::ScoringWeights;

/// Minutes added per ridden stop when estimating total journey time.
const MINUTES_PER_STOP: u32 = 2;

/// One end of an itinerary: the stop used and the walk to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub stop: Stop,
    pub walking_distance_m: f64,
    pub walking_time_min: u32,
}

impl Endpoint {
    pub fn new(stop: Stop, walking_distance_m: f64, walking_time_min: u32) -> Self {
        Self {
            stop,
            walking_distance_m,
            walking_time_min,
        }
    }

    /// An endpoint reached without walking.
    pub fn at_stop(stop: Stop) -> Self {
        Self::new(stop, 0.0, 0)
    }
}

/// A candidate journey, immutable once scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub origin: Endpoint,
    pub destination: Endpoint,
    pub segments: Vec<Segment>,
    pub transfer_count: usize,
    pub transit_cost: f64,
    pub walking_distance_m: f64,
    pub score: f64,

    /// Hub the itinerary was joined at, for fallback results.
    pub hub: Option<Stop>,
}

/// Identity of an itinerary for deduplication: `(route_id, board, alight)`
/// per segment.
pub type RouteKey = Vec<(String, String, String)>;

impl Itinerary {
    /// Score a segment list. Returns `None` for an empty list.
    pub fn new(
        origin: Endpoint,
        destination: Endpoint,
        segments: Vec<Segment>,
        transit_cost: f64,
        weights: &ScoringWeights,
    ) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        let transfer_count = segments.len() - 1;
        let walking_distance_m = origin.walking_distance_m + destination.walking_distance_m;
        let cbd_stops = segments.iter().map(|s| s.cbd_stops.len()).sum();
        let score = weights.score(transfer_count, walking_distance_m, transit_cost, cbd_stops);

        Some(Self {
            origin,
            destination,
            segments,
            transfer_count,
            transit_cost,
            walking_distance_m,
            score,
            hub: None,
        })
    }

    /// Join an origin-to-hub leg with a hub-to-destination leg.
    ///
    /// The joined itinerary counts one extra transfer at the hub and pays
    /// `hub_penalty` on top of both legs' transit costs.
    pub fn join(
        left: &Itinerary,
        right: &Itinerary,
        hub_penalty: f64,
        weights: &ScoringWeights,
    ) -> Option<Self> {
        let segments: Vec<Segment> = left
            .segments
            .iter()
            .chain(&right.segments)
            .cloned()
            .collect();
        let transit_cost = left.transit_cost + right.transit_cost + hub_penalty;

        let mut joined = Self::new(
            left.origin.clone(),
            right.destination.clone(),
            segments,
            transit_cost,
            weights,
        )?;
        joined.hub = Some(right.origin.stop.clone());
        Some(joined)
    }

    pub fn total_cbd_stops(&self) -> usize {
        self.segments.iter().map(|s| s.cbd_stops.len()).sum()
    }

    /// Segments with at least one CBD stop.
    pub fn cbd_segments(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| !s.cbd_stops.is_empty())
            .count()
    }

    pub fn goes_through_cbd(&self) -> bool {
        self.total_cbd_stops() > 0
    }

    /// Ridden stops across all segments.
    pub fn stop_count(&self) -> usize {
        self.segments.iter().map(Segment::stop_count).sum()
    }

    /// Walking minutes at both ends plus a fixed allowance per ridden stop.
    pub fn estimated_total_time_min(&self) -> u32 {
        self.origin.walking_time_min
            + self.destination.walking_time_min
            + self.stop_count() as u32 * MINUTES_PER_STOP
    }

    pub fn route_key(&self) -> RouteKey {
        self.segments
            .iter()
            .map(|s| {
                (
                    s.route_id.clone(),
                    s.board_stop.clone(),
                    s.alight_stop.clone(),
                )
            })
            .collect()
    }
}
