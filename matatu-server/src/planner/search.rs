//! Direct-first itinerary search with hub fallback.
//!
//! Every origin/destination candidate pair is an independent oracle query
//! run on the blocking pool. A pair that fails is dropped from the pool of
//! candidates; only exhaustion of the whole search reaches the caller.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::graph::{GraphView, NearbyStop};
use crate::oracle::{PairError, PathTrace};

use super::assemble::assemble;
use super::classify::Classifier;
use super::config::{Coordinate, RoutingConfig};
use super::cost::CostView;
use super::itinerary::{Endpoint, Itinerary};
use super::rank::{deduplicate, rank_by_transit_cost, rank_itineraries};

/// Largest `k` accepted by name-based search.
pub const MAX_NAME_ALTERNATIVES: usize = 5;

/// Error from itinerary search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// No stop near a coordinate, or no stop matching a name
    #[error("not found: {0}")]
    NotFound(String),

    /// Path search cannot run at all
    #[error("routing unavailable: {0}")]
    OracleUnavailable(String),

    /// Candidates exist but no itinerary joins them
    #[error("no viable routes found between candidate stops")]
    NoViableItinerary(Box<SearchDiagnostics>),

    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

/// What a search tried, for telling "nothing nearby" apart from
/// "nearby stops exist but are disconnected".
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchDiagnostics {
    pub origin_candidates_found: usize,
    pub destination_candidates_found: usize,
    pub hubs_found: usize,
    pub pairs_attempted: usize,
    pub successful_queries: usize,
    pub itineraries_evaluated: usize,
    pub deadline_expired: bool,
    pub origin_candidates: Vec<String>,
    pub destination_candidates: Vec<String>,
}

impl SearchDiagnostics {
    fn record(&mut self, batch: &PairBatch) {
        self.pairs_attempted += batch.attempted;
        self.successful_queries += batch.traces.len();
        self.deadline_expired |= batch.expired;
    }
}

/// How the returned itineraries were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingStrategy {
    Direct,
    TownFallback,
}

impl RoutingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingStrategy::Direct => "direct",
            RoutingStrategy::TownFallback => "town_fallback",
        }
    }
}

/// Request for a coordinate-to-coordinate search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,

    /// Candidate stop radius around each endpoint (metres).
    pub search_radius_m: f64,

    /// Candidate stops considered per endpoint.
    pub max_candidates: usize,

    /// Itineraries returned.
    pub max_alternatives: usize,
}

impl SearchRequest {
    /// Create a request using the configured defaults.
    pub fn new(origin: Coordinate, destination: Coordinate, config: &RoutingConfig) -> Self {
        Self {
            origin,
            destination,
            search_radius_m: config.search_radius_m,
            max_candidates: config.max_candidates,
            max_alternatives: config.max_alternatives,
        }
    }

    pub fn with_search_radius(mut self, search_radius_m: f64) -> Self {
        self.search_radius_m = search_radius_m;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_max_alternatives(mut self, max_alternatives: usize) -> Self {
        self.max_alternatives = max_alternatives;
        self
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(), SearchError> {
        for (label, c) in [("origin", self.origin), ("destination", self.destination)] {
            if !(-90.0..=90.0).contains(&c.lat) {
                return Err(SearchError::InvalidRequest(format!(
                    "{label} latitude {} is out of range",
                    c.lat
                )));
            }
            if !(-180.0..=180.0).contains(&c.lon) {
                return Err(SearchError::InvalidRequest(format!(
                    "{label} longitude {} is out of range",
                    c.lon
                )));
            }
        }

        if !self.search_radius_m.is_finite() || self.search_radius_m <= 0.0 {
            return Err(SearchError::InvalidRequest(
                "search radius must be positive".to_string(),
            ));
        }
        if self.max_candidates == 0 {
            return Err(SearchError::InvalidRequest(
                "max_candidates must be at least 1".to_string(),
            ));
        }
        if self.max_alternatives == 0 {
            return Err(SearchError::InvalidRequest(
                "max_alternatives must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Result of itinerary search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Found itineraries, ranked best-first.
    pub itineraries: Vec<Itinerary>,

    pub strategy: RoutingStrategy,

    pub diagnostics: SearchDiagnostics,

    /// Display labels for the routes used by `itineraries`.
    pub route_labels: HashMap<String, String>,
}

impl SearchResult {
    /// Display label of a route, falling back to its id.
    pub fn label_for<'a>(&'a self, route_id: &'a str) -> &'a str {
        self.route_labels
            .get(route_id)
            .map(String::as_str)
            .unwrap_or(route_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Direct,
    ToHub,
    FromHub,
}

/// One origin/destination query.
#[derive(Debug, Clone)]
struct PairJob {
    /// Position in candidate-rank order, used to merge results.
    seq: usize,
    leg: Leg,
    origin: Endpoint,
    destination: Endpoint,
}

#[derive(Debug, Default)]
struct PairBatch {
    traces: Vec<(PairJob, PathTrace)>,
    attempted: usize,
    aborted: usize,
    expired: bool,
}

/// Itinerary planner over a shared, read-only graph.
pub struct Planner<G: GraphView + 'static> {
    graph: Arc<G>,
    config: Arc<RoutingConfig>,
    classifier: Classifier,
}

impl<G: GraphView + 'static> Planner<G> {
    /// Create a new planner.
    pub fn new(graph: Arc<G>, config: Arc<RoutingConfig>) -> Self {
        let classifier = Classifier::new(&config);
        Self {
            graph,
            config,
            classifier,
        }
    }

    pub fn graph(&self) -> &Arc<G> {
        &self.graph
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Plan between two coordinates.
    ///
    /// Direct candidate pairs are tried first. If none yields an itinerary
    /// with at most `max_direct_transfers` transfers, legs to and from hubs
    /// around the town centre are searched and joined at shared hubs.
    pub async fn plan_by_coordinates(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResult, SearchError> {
        request.validate()?;
        self.ensure_routable()?;
        let deadline = Instant::now() + self.config.request_timeout();

        let origins = self.candidates(request.origin, request);
        let destinations = self.candidates(request.destination, request);

        let mut diagnostics = SearchDiagnostics {
            origin_candidates_found: origins.len(),
            destination_candidates_found: destinations.len(),
            origin_candidates: origins.iter().map(|e| e.stop.name.clone()).collect(),
            destination_candidates: destinations.iter().map(|e| e.stop.name.clone()).collect(),
            ..Default::default()
        };

        if origins.is_empty() || destinations.is_empty() {
            let side = if origins.is_empty() {
                "origin"
            } else {
                "destination"
            };
            return Err(SearchError::NotFound(format!(
                "no stops found within {}m of {side}",
                request.search_radius_m
            )));
        }

        debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            "Candidate stops found"
        );

        let view = Arc::new(CostView::build(
            self.graph.as_ref(),
            &self.config.cost,
            &self.classifier,
        ));

        // Direct attempt
        let jobs = pair_jobs(&origins, &destinations, Leg::Direct, 0);
        let batch = self.run_pairs(jobs, Arc::clone(&view), deadline).await;
        diagnostics.record(&batch);
        self.check_oracle(&batch)?;

        let direct = self.assemble_batch(batch.traces);
        diagnostics.itineraries_evaluated += direct.len();
        let direct = deduplicate(rank_itineraries(direct.into_iter().map(|(_, it)| it).collect()));

        if direct
            .iter()
            .any(|it| it.transfer_count <= self.config.max_direct_transfers)
        {
            let chosen: Vec<Itinerary> = direct
                .into_iter()
                .filter(|it| it.transfer_count <= self.config.max_direct_transfers)
                .take(request.max_alternatives)
                .collect();
            return Ok(self.finish(chosen, RoutingStrategy::Direct, diagnostics));
        }

        if batch.expired {
            return self.best_so_far(direct, RoutingStrategy::Direct, diagnostics, request);
        }

        // Hub fallback
        let hubs = self.hubs();
        diagnostics.hubs_found = hubs.len();
        info!(
            direct_found = direct.len(),
            hubs = hubs.len(),
            "No acceptable direct itinerary, trying town fallback"
        );
        if hubs.is_empty() {
            return Err(SearchError::NoViableItinerary(Box::new(diagnostics)));
        }

        let mut jobs = pair_jobs(&origins, &hubs, Leg::ToHub, 0);
        let offset = jobs.len();
        jobs.extend(pair_jobs(&hubs, &destinations, Leg::FromHub, offset));

        let batch = self.run_pairs(jobs, view, deadline).await;
        diagnostics.record(&batch);
        self.check_oracle(&batch)?;

        let legs = self.assemble_batch(batch.traces);
        diagnostics.itineraries_evaluated += legs.len();

        let (to_hub, from_hub): (Vec<_>, Vec<_>) =
            legs.into_iter().partition(|(leg, _)| *leg == Leg::ToHub);

        let mut joined = Vec::new();
        for (_, left) in &to_hub {
            for (_, right) in &from_hub {
                if left.destination.stop.node_index != right.origin.stop.node_index {
                    continue;
                }
                if let Some(it) = Itinerary::join(
                    left,
                    right,
                    self.config.hub_transfer_penalty,
                    &self.config.scoring,
                ) {
                    joined.push(it);
                }
            }
        }

        let joined = deduplicate(rank_itineraries(joined));
        if joined.is_empty() {
            if batch.expired {
                return self.best_so_far(direct, RoutingStrategy::Direct, diagnostics, request);
            }
            warn!(
                pairs = diagnostics.pairs_attempted,
                "No joinable hub itinerary"
            );
            return Err(SearchError::NoViableItinerary(Box::new(diagnostics)));
        }

        let chosen = joined.into_iter().take(request.max_alternatives).collect();
        Ok(self.finish(chosen, RoutingStrategy::TownFallback, diagnostics))
    }

    /// Plan between two stops matched by name, returning up to `k`
    /// alternatives from the k-shortest-paths oracle.
    pub async fn plan_by_name(
        &self,
        origin: &str,
        destination: &str,
        k: usize,
    ) -> Result<SearchResult, SearchError> {
        if !(1..=MAX_NAME_ALTERNATIVES).contains(&k) {
            return Err(SearchError::InvalidRequest(format!(
                "alternatives must be between 1 and {MAX_NAME_ALTERNATIVES}"
            )));
        }
        self.ensure_routable()?;
        let deadline = Instant::now() + self.config.request_timeout();

        let origin_stop = self
            .graph
            .stop_by_name(origin)
            .cloned()
            .ok_or_else(|| SearchError::NotFound(format!("no stop matching '{origin}'")))?;
        let destination_stop = self
            .graph
            .stop_by_name(destination)
            .cloned()
            .ok_or_else(|| SearchError::NotFound(format!("no stop matching '{destination}'")))?;

        let mut diagnostics = SearchDiagnostics {
            origin_candidates_found: 1,
            destination_candidates_found: 1,
            pairs_attempted: 1,
            origin_candidates: vec![origin_stop.name.clone()],
            destination_candidates: vec![destination_stop.name.clone()],
            ..Default::default()
        };

        let view = CostView::build(self.graph.as_ref(), &self.config.cost, &self.classifier);
        let graph = Arc::clone(&self.graph);
        let (source, target) = (origin_stop.node_index, destination_stop.node_index);
        let task = tokio::task::spawn_blocking(move || {
            graph.k_shortest_paths(&view, source, target, k)
        });

        let traces = match timeout_at(deadline, task).await {
            Ok(Ok(Ok(traces))) => traces,
            Ok(Ok(Err(e))) => {
                debug!(%source, %target, error = %e, "No path between named stops");
                Vec::new()
            }
            Ok(Err(e)) => {
                return Err(SearchError::OracleUnavailable(
                    PairError::Aborted(e.to_string()).to_string(),
                ));
            }
            Err(_) => {
                warn!("Deadline expired during k-shortest search");
                diagnostics.deadline_expired = true;
                Vec::new()
            }
        };
        if !traces.is_empty() {
            diagnostics.successful_queries = 1;
        }

        let itineraries: Vec<Itinerary> = traces
            .iter()
            .filter_map(|trace| {
                Itinerary::new(
                    Endpoint::at_stop(origin_stop.clone()),
                    Endpoint::at_stop(destination_stop.clone()),
                    assemble(self.graph.as_ref(), trace, &self.classifier),
                    trace.total_cost(),
                    &self.config.scoring,
                )
            })
            .collect();
        diagnostics.itineraries_evaluated = itineraries.len();

        let mut ranked = deduplicate(rank_by_transit_cost(itineraries));
        ranked.truncate(k);

        if ranked.is_empty() {
            return Err(SearchError::NoViableItinerary(Box::new(diagnostics)));
        }
        Ok(self.finish(ranked, RoutingStrategy::Direct, diagnostics))
    }

    fn ensure_routable(&self) -> Result<(), SearchError> {
        if self.graph.edges().is_empty() {
            return Err(SearchError::OracleUnavailable(
                "graph has no edges".to_string(),
            ));
        }
        Ok(())
    }

    /// Every pair task of a non-empty batch crashing means the oracle
    /// itself is broken, not the pairs.
    fn check_oracle(&self, batch: &PairBatch) -> Result<(), SearchError> {
        if batch.attempted > 0 && batch.aborted == batch.attempted {
            return Err(SearchError::OracleUnavailable(format!(
                "all {} pair queries aborted",
                batch.attempted
            )));
        }
        Ok(())
    }

    fn endpoint(&self, nearby: NearbyStop) -> Endpoint {
        let minutes = self
            .config
            .walking
            .minutes(nearby.distance_m, self.classifier.is_cbd(&nearby.stop));
        Endpoint::new(nearby.stop, nearby.distance_m, minutes)
    }

    fn candidates(&self, at: Coordinate, request: &SearchRequest) -> Vec<Endpoint> {
        self.graph
            .nearby_stops(at.lat, at.lon, request.search_radius_m, request.max_candidates)
            .into_iter()
            .map(|n| self.endpoint(n))
            .collect()
    }

    /// Hub stops near the town centre, closest first.
    fn hubs(&self) -> Vec<Endpoint> {
        let center = self.config.town_center;
        self.graph
            .nearby_stops(
                center.lat,
                center.lon,
                self.config.town_radius_m,
                self.config.hub_scan_limit,
            )
            .into_iter()
            .filter(|n| self.classifier.is_hub(self.graph.as_ref(), n.stop.node_index))
            .take(self.config.max_hubs)
            .map(|n| Endpoint::at_stop(n.stop))
            .collect()
    }

    /// Run pair queries concurrently until all finish or the deadline hits.
    ///
    /// Results are returned in job order regardless of completion order.
    async fn run_pairs(
        &self,
        jobs: Vec<PairJob>,
        view: Arc<CostView>,
        deadline: Instant,
    ) -> PairBatch {
        let mut batch = PairBatch {
            attempted: jobs.len(),
            ..Default::default()
        };
        let mut tasks = JoinSet::new();

        for job in jobs {
            let graph = Arc::clone(&self.graph);
            let view = Arc::clone(&view);
            tasks.spawn_blocking(move || {
                let result = graph.shortest_path(
                    &view,
                    job.origin.stop.node_index,
                    job.destination.stop.node_index,
                );
                (job, result)
            });
        }

        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((job, Ok(trace))))) => batch.traces.push((job, trace)),
                Ok(Some(Ok((job, Err(e))))) => {
                    debug!(
                        origin = %job.origin.stop.name,
                        destination = %job.destination.stop.name,
                        error = %e,
                        "No route for pair"
                    );
                }
                Ok(Some(Err(e))) => {
                    batch.aborted += 1;
                    debug!(error = %PairError::Aborted(e.to_string()), "Pair task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        pending = tasks.len(),
                        "Request deadline expired, keeping results so far"
                    );
                    // Only queued pairs are cancelled. Running oracle calls
                    // finish on the blocking pool.
                    tasks.abort_all();
                    batch.expired = true;
                    break;
                }
            }
        }

        batch.traces.sort_by_key(|(job, _)| job.seq);
        batch
    }

    fn assemble_batch(&self, traces: Vec<(PairJob, PathTrace)>) -> Vec<(Leg, Itinerary)> {
        traces
            .into_iter()
            .filter_map(|(job, trace)| {
                let segments = assemble(self.graph.as_ref(), &trace, &self.classifier);
                let itinerary = Itinerary::new(
                    job.origin,
                    job.destination,
                    segments,
                    trace.total_cost(),
                    &self.config.scoring,
                )?;
                Some((job.leg, itinerary))
            })
            .collect()
    }

    fn best_so_far(
        &self,
        ranked: Vec<Itinerary>,
        strategy: RoutingStrategy,
        diagnostics: SearchDiagnostics,
        request: &SearchRequest,
    ) -> Result<SearchResult, SearchError> {
        if ranked.is_empty() {
            return Err(SearchError::NoViableItinerary(Box::new(diagnostics)));
        }
        let chosen = ranked.into_iter().take(request.max_alternatives).collect();
        Ok(self.finish(chosen, strategy, diagnostics))
    }

    fn finish(
        &self,
        itineraries: Vec<Itinerary>,
        strategy: RoutingStrategy,
        diagnostics: SearchDiagnostics,
    ) -> SearchResult {
        let route_ids: BTreeSet<String> = itineraries
            .iter()
            .flat_map(|it| it.segments.iter().map(|s| s.route_id.clone()))
            .collect();
        let route_labels = self.graph.route_labels(&route_ids);

        info!(
            strategy = strategy.as_str(),
            itineraries = itineraries.len(),
            pairs = diagnostics.pairs_attempted,
            "Search complete"
        );

        SearchResult {
            itineraries,
            strategy,
            diagnostics,
            route_labels,
        }
    }
}

/// Cartesian product of two candidate lists in rank order.
fn pair_jobs(origins: &[Endpoint], destinations: &[Endpoint], leg: Leg, offset: usize) -> Vec<PairJob> {
    origins
        .iter()
        .flat_map(|o| destinations.iter().map(move |d| (o, d)))
        .enumerate()
        .map(|(i, (origin, destination))| PairJob {
            seq: offset + i,
            leg,
            origin: origin.clone(),
            destination: destination.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
