//! Itinerary planning over the transit graph.
//!
//! A search starts from the stops nearest each endpoint and asks the
//! path oracle for every origin/destination pair. Raw traces are folded
//! into per-route segments, scored, deduplicated and ranked. When no
//! direct result is acceptable, the search retries through hub stops
//! near the town centre and joins the two legs.

mod assemble;
mod classify;
mod config;
mod cost;
mod itinerary;
mod rank;
mod score;
mod search;

pub use assemble::{Segment, assemble};
pub use classify::{CBD_LANDMARKS, Classifier, HubTier};
pub use config::{ConfigError, Coordinate, RoutingConfig, WalkingSpeeds};
pub use cost::{CostPolicy, CostView};
pub use itinerary::{Endpoint, Itinerary, RouteKey};
pub use rank::{deduplicate, rank_by_transit_cost, rank_itineraries};
pub use score::ScoringWeights;
pub use search::{
    MAX_NAME_ALTERNATIVES, Planner, RoutingStrategy, SearchDiagnostics, SearchError,
    SearchRequest, SearchResult,
};
