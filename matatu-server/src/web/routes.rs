//! HTTP route handlers.

use std::ops::RangeInclusive;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::planner::{
    Coordinate, MAX_NAME_ALTERNATIVES, SearchDiagnostics, SearchError, SearchRequest,
};

use super::dto::*;
use super::state::AppState;

const SEARCH_RADIUS_RANGE: RangeInclusive<u32> = 100..=2000;
const MAX_CANDIDATES_RANGE: RangeInclusive<usize> = 3..=10;
const ALTERNATIVES_RANGE: RangeInclusive<usize> = 1..=MAX_NAME_ALTERNATIVES;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/routes", get(best_routes))
        .route("/routes/alternatives", get(alternative_routes))
        .route("/routes/by-coordinates", get(routes_by_coordinates))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn check_range<T>(name: &str, value: T, range: &RangeInclusive<T>) -> Result<(), AppError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        return Ok(());
    }
    Err(AppError::BadRequest {
        message: format!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        ),
    })
}

/// Routes between two named stops, with the configured number of
/// alternatives.
async fn best_routes(
    State(state): State<AppState>,
    Query(req): Query<NameRouteRequest>,
) -> Result<Json<NameRouteResponse>, AppError> {
    let k = state.config.max_alternatives.clamp(1, MAX_NAME_ALTERNATIVES);
    plan_named(&state, &req.origin, &req.destination, k).await
}

/// Up to `max_alternatives` routes between two named stops.
async fn alternative_routes(
    State(state): State<AppState>,
    Query(req): Query<NameRouteRequest>,
) -> Result<Json<NameRouteResponse>, AppError> {
    check_range("max_alternatives", req.max_alternatives, &ALTERNATIVES_RANGE)?;
    plan_named(&state, &req.origin, &req.destination, req.max_alternatives).await
}

async fn plan_named(
    state: &AppState,
    origin: &str,
    destination: &str,
    k: usize,
) -> Result<Json<NameRouteResponse>, AppError> {
    let result = state.planner.plan_by_name(origin, destination, k).await?;
    Ok(Json(NameRouteResponse::new(&result)))
}

/// Routes between two coordinates via nearby candidate stops.
async fn routes_by_coordinates(
    State(state): State<AppState>,
    Query(req): Query<CoordinateRouteRequest>,
) -> Result<Json<CoordinateRouteResponse>, AppError> {
    check_range("search_radius", req.search_radius, &SEARCH_RADIUS_RANGE)?;
    check_range("max_candidates", req.max_candidates, &MAX_CANDIDATES_RANGE)?;
    check_range("alternatives", req.alternatives, &ALTERNATIVES_RANGE)?;

    let origin = Coordinate::new(req.origin_lat, req.origin_lon);
    let destination = Coordinate::new(req.dest_lat, req.dest_lon);
    let request = SearchRequest::new(origin, destination, &state.config)
        .with_search_radius(f64::from(req.search_radius))
        .with_max_candidates(req.max_candidates)
        .with_max_alternatives(req.alternatives);
    request.validate()?;

    let key = state.cache.key(&request);
    let result = match state.cache.get(&key).await {
        Some(cached) => {
            debug!(?key, "Plan cache hit");
            cached
        }
        None => {
            let result = Arc::new(state.planner.plan_by_coordinates(&request).await?);
            if !state.cache.insert(key, Arc::clone(&result)).await {
                debug!(?key, "Deadline expired, plan not cached");
            }
            result
        }
    };

    let echo = RequestEcho {
        origin_coordinates: origin.into(),
        destination_coordinates: destination.into(),
        search_radius_m: req.search_radius,
    };
    Ok(Json(CoordinateRouteResponse::new(echo, &result)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
    },
    NotFound {
        message: String,
        debug_info: Option<SearchDiagnostics>,
    },
    Unavailable {
        message: String,
    },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        let message = e.to_string();
        match e {
            SearchError::InvalidRequest(_) => AppError::BadRequest { message },
            SearchError::NotFound(_) => AppError::NotFound {
                message,
                debug_info: None,
            },
            SearchError::NoViableItinerary(diagnostics) => AppError::NotFound {
                message,
                debug_info: Some(*diagnostics),
            },
            SearchError::OracleUnavailable(_) => AppError::Unavailable { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, debug_info) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, None),
            AppError::NotFound {
                message,
                debug_info,
            } => (StatusCode::NOT_FOUND, message, debug_info),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message, None),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            debug_info,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::graph::{Edge, EdgeType, GraphBuilder, NodeIndex, Stop, TransitGraph};
    use crate::planner::RoutingConfig;

    fn graph() -> TransitGraph {
        GraphBuilder::new()
            .stop(Stop::new("0001", NodeIndex(0), "Kangemi", -1.2697, 36.7482))
            .stop(Stop::new("0002", NodeIndex(1), "Westlands", -1.2650, 36.8030))
            .stop(Stop::new("0003", NodeIndex(2), "Kencom", -1.2864, 36.8250))
            .edge(Edge::new(NodeIndex(0), NodeIndex(1), 5.0, EdgeType::Direct).on_route("R1"))
            .edge(Edge::new(NodeIndex(1), NodeIndex(2), 5.0, EdgeType::Direct).on_route("R1"))
            .route("R1", "46")
            .build()
            .unwrap()
    }

    fn state() -> AppState {
        AppState::new(graph(), RoutingConfig::default(), &CacheConfig::default())
    }

    fn coordinates(search_radius: u32, max_candidates: usize) -> CoordinateRouteRequest {
        CoordinateRouteRequest {
            origin_lat: -1.2697,
            origin_lon: 36.7482,
            dest_lat: -1.2864,
            dest_lon: 36.8250,
            search_radius,
            max_candidates,
            alternatives: 3,
        }
    }

    #[tokio::test]
    async fn by_coordinates_serializes_routes() {
        let Json(response) = routes_by_coordinates(State(state()), Query(coordinates(500, 5)))
            .await
            .unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["routing_strategy"], "direct");
        assert_eq!(json["alternatives_count"], 1);
        assert_eq!(json["request"]["search_radius_m"], 500);
        assert_eq!(json["optimization"]["candidates_tested"], 1);

        let route = &json["routes"][0];
        assert_eq!(route["route_rank"], 1);
        assert_eq!(route["transfers"], 0);
        assert_eq!(route["origin"]["stop_name"], "Kangemi");
        assert_eq!(route["segments"][0]["route_label"], "46");
        assert_eq!(route["segments"][0]["alight"], "Kencom");
        assert_eq!(route["segments"][0]["cbd_stops"][0], "Kencom");
        assert_eq!(route["cbd_routing"]["goes_through_cbd"], true);
        assert!(route.get("hub").is_none());
    }

    #[tokio::test]
    async fn repeated_coordinate_request_uses_cache() {
        let state = state();
        let first = routes_by_coordinates(State(state.clone()), Query(coordinates(500, 5)))
            .await
            .unwrap();
        let key = state.cache.key(&SearchRequest::new(
            Coordinate::new(-1.2697, 36.7482),
            Coordinate::new(-1.2864, 36.8250),
            &state.config,
        ));
        assert!(state.cache.get(&key).await.is_some());

        let second = routes_by_coordinates(State(state), Query(coordinates(500, 5)))
            .await
            .unwrap();
        assert_eq!(first.0.alternatives_count, second.0.alternatives_count);
    }

    #[tokio::test]
    async fn out_of_range_parameters_are_bad_requests() {
        for req in [coordinates(50, 5), coordinates(500, 2), coordinates(2500, 5)] {
            let err = routes_by_coordinates(State(state()), Query(req))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest { .. }));
        }
    }

    #[tokio::test]
    async fn alternatives_by_name() {
        let req = NameRouteRequest {
            origin: "kangemi".to_string(),
            destination: "kencom".to_string(),
            max_alternatives: 2,
        };
        let Json(response) = alternative_routes(State(state()), Query(req)).await.unwrap();

        assert_eq!(response.origin, "Kangemi");
        assert_eq!(response.destination, "Kencom");
        assert_eq!(response.routing_strategy, "direct");
        assert_eq!(response.alternatives_count, 1);
    }

    #[tokio::test]
    async fn unknown_stop_is_not_found() {
        let req = NameRouteRequest {
            origin: "nowhere".to_string(),
            destination: "kencom".to_string(),
            max_alternatives: 3,
        };
        let err = best_routes(State(state()), Query(req)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn search_errors_map_to_statuses() {
        let status = |e: SearchError| AppError::from(e).into_response().status();

        assert_eq!(
            status(SearchError::InvalidRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(SearchError::NotFound("gone".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(SearchError::NoViableItinerary(Box::default())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(SearchError::OracleUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn no_viable_itinerary_carries_debug_info() {
        let diagnostics = SearchDiagnostics {
            origin_candidates_found: 2,
            ..Default::default()
        };
        match AppError::from(SearchError::NoViableItinerary(Box::new(diagnostics))) {
            AppError::NotFound { debug_info, .. } => {
                assert_eq!(debug_info.map(|d| d.origin_candidates_found), Some(2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
