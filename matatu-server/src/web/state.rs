//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CacheConfig, PlanCache};
use crate::graph::TransitGraph;
use crate::planner::{Planner, RoutingConfig};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Planner over the loaded graph snapshot
    pub planner: Arc<Planner<TransitGraph>>,

    /// Coordinate plan cache
    pub cache: Arc<PlanCache>,

    /// Routing configuration
    pub config: Arc<RoutingConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(graph: TransitGraph, config: RoutingConfig, cache_config: &CacheConfig) -> Self {
        let config = Arc::new(config);
        Self {
            planner: Arc::new(Planner::new(Arc::new(graph), Arc::clone(&config))),
            cache: Arc::new(PlanCache::new(cache_config)),
            config,
        }
    }
}
