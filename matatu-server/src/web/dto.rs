//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::graph::Stop;
use crate::planner::{
    Coordinate, Endpoint, Itinerary, SearchDiagnostics, SearchResult, Segment,
};

fn default_search_radius() -> u32 {
    500
}

fn default_max_candidates() -> usize {
    5
}

fn default_alternatives() -> usize {
    3
}

/// Request to route between two stops by name.
#[derive(Debug, Deserialize)]
pub struct NameRouteRequest {
    /// Origin stop name (partial allowed)
    pub origin: String,

    /// Destination stop name (partial allowed)
    pub destination: String,

    /// Number of alternative routes
    #[serde(default = "default_alternatives")]
    pub max_alternatives: usize,
}

/// Request to route between two coordinates.
#[derive(Debug, Deserialize)]
pub struct CoordinateRouteRequest {
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub dest_lat: f64,
    pub dest_lon: f64,

    /// Candidate search radius in metres
    #[serde(default = "default_search_radius")]
    pub search_radius: u32,

    /// Candidate stops considered per endpoint
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Number of alternative routes
    #[serde(default = "default_alternatives")]
    pub alternatives: usize,
}

#[derive(Debug, Serialize)]
pub struct CoordinateResult {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinate> for CoordinateResult {
    fn from(c: Coordinate) -> Self {
        Self { lat: c.lat, lon: c.lon }
    }
}

/// A stop used as an itinerary endpoint.
#[derive(Debug, Serialize)]
pub struct EndpointResult {
    pub stop_id: String,
    pub stop_name: String,
    pub coordinates: CoordinateResult,
    pub walking_distance_m: f64,
    pub walking_time_min: u32,
}

impl EndpointResult {
    pub fn from_endpoint(endpoint: &Endpoint) -> Self {
        Self {
            stop_id: endpoint.stop.stop_id.clone(),
            stop_name: endpoint.stop.name.clone(),
            coordinates: CoordinateResult {
                lat: endpoint.stop.lat,
                lon: endpoint.stop.lon,
            },
            walking_distance_m: endpoint.walking_distance_m.round(),
            walking_time_min: endpoint.walking_time_min,
        }
    }
}

/// Hub stop a fallback itinerary changes at.
#[derive(Debug, Serialize)]
pub struct HubResult {
    pub stop_id: String,
    pub stop_name: String,
    pub coordinates: CoordinateResult,
}

impl HubResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            stop_id: stop.stop_id.clone(),
            stop_name: stop.name.clone(),
            coordinates: CoordinateResult {
                lat: stop.lat,
                lon: stop.lon,
            },
        }
    }
}

/// One ride on a single route.
#[derive(Debug, Serialize)]
pub struct SegmentResult {
    pub route_id: String,

    /// Display name, falling back to the route id
    pub route_label: String,

    pub board: String,
    pub alight: String,
    pub stops: Vec<String>,
    pub stop_count: usize,
    pub cbd_stops: Vec<String>,
}

impl SegmentResult {
    pub fn from_segment(segment: &Segment, result: &SearchResult) -> Self {
        Self {
            route_id: segment.route_id.clone(),
            route_label: result.label_for(&segment.route_id).to_string(),
            board: segment.board_stop.clone(),
            alight: segment.alight_stop.clone(),
            stops: segment.stops.clone(),
            stop_count: segment.stop_count(),
            cbd_stops: segment.cbd_stops.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CbdRoutingResult {
    pub goes_through_cbd: bool,
    pub total_cbd_stops: usize,
    pub cbd_segments: usize,
}

/// A ranked itinerary.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    /// 1-based rank
    pub route_rank: usize,
    pub origin: EndpointResult,
    pub destination: EndpointResult,
    pub transfers: usize,
    pub segments: Vec<SegmentResult>,
    pub transit_cost: f64,
    pub optimization_score: f64,
    pub total_walking_distance_m: f64,
    pub estimated_total_time_min: u32,
    pub cbd_routing: CbdRoutingResult,

    /// Present for town-fallback itineraries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub: Option<HubResult>,
}

impl RouteResult {
    pub fn from_itinerary(rank: usize, itinerary: &Itinerary, result: &SearchResult) -> Self {
        Self {
            route_rank: rank,
            origin: EndpointResult::from_endpoint(&itinerary.origin),
            destination: EndpointResult::from_endpoint(&itinerary.destination),
            transfers: itinerary.transfer_count,
            segments: itinerary
                .segments
                .iter()
                .map(|s| SegmentResult::from_segment(s, result))
                .collect(),
            transit_cost: itinerary.transit_cost,
            optimization_score: itinerary.score,
            total_walking_distance_m: itinerary.walking_distance_m.round(),
            estimated_total_time_min: itinerary.estimated_total_time_min(),
            cbd_routing: CbdRoutingResult {
                goes_through_cbd: itinerary.goes_through_cbd(),
                total_cbd_stops: itinerary.total_cbd_stops(),
                cbd_segments: itinerary.cbd_segments(),
            },
            hub: itinerary.hub.as_ref().map(HubResult::from_stop),
        }
    }

    /// Every itinerary of a result, ranked from 1.
    pub fn ranked(result: &SearchResult) -> Vec<Self> {
        result
            .itineraries
            .iter()
            .enumerate()
            .map(|(i, it)| Self::from_itinerary(i + 1, it, result))
            .collect()
    }
}

/// Echo of a coordinate request.
#[derive(Debug, Serialize)]
pub struct RequestEcho {
    pub origin_coordinates: CoordinateResult,
    pub destination_coordinates: CoordinateResult,
    pub search_radius_m: u32,
}

#[derive(Debug, Serialize)]
pub struct OptimizationResult {
    /// Origin/destination pairs queried
    pub candidates_tested: usize,

    /// Itineraries assembled before deduplication
    pub total_combinations_evaluated: usize,
}

/// Response for coordinate routing.
#[derive(Debug, Serialize)]
pub struct CoordinateRouteResponse {
    pub request: RequestEcho,
    pub routing_strategy: &'static str,
    pub alternatives_count: usize,
    pub routes: Vec<RouteResult>,
    pub optimization: OptimizationResult,
}

impl CoordinateRouteResponse {
    pub fn new(request: RequestEcho, result: &SearchResult) -> Self {
        let routes = RouteResult::ranked(result);
        Self {
            request,
            routing_strategy: result.strategy.as_str(),
            alternatives_count: routes.len(),
            routes,
            optimization: OptimizationResult {
                candidates_tested: result.diagnostics.pairs_attempted,
                total_combinations_evaluated: result.diagnostics.itineraries_evaluated,
            },
        }
    }
}

/// Response for name routing.
#[derive(Debug, Serialize)]
pub struct NameRouteResponse {
    pub origin: String,
    pub destination: String,
    pub routing_strategy: &'static str,
    pub alternatives_count: usize,
    pub routes: Vec<RouteResult>,
}

impl NameRouteResponse {
    pub fn new(result: &SearchResult) -> Self {
        let routes = RouteResult::ranked(result);
        Self {
            origin: first_or_empty(&result.diagnostics.origin_candidates),
            destination: first_or_empty(&result.diagnostics.destination_candidates),
            routing_strategy: result.strategy.as_str(),
            alternatives_count: routes.len(),
            routes,
        }
    }
}

fn first_or_empty(names: &[String]) -> String {
    names.first().cloned().unwrap_or_default()
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    /// What the search tried, when candidates existed but nothing joined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<SearchDiagnostics>,
}
