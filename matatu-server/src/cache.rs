//! Caching layer for coordinate plans.
//!
//! The graph is an immutable snapshot, so a plan only depends on the
//! request. Coordinates are quantised before keying so that requests a
//! metre or so apart share an entry while cardinality stays bounded.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::planner::{SearchRequest, SearchResult};

/// Cache key for coordinate plans: quantised endpoints plus the search
/// parameters that change the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanKey {
    origin: (i64, i64),
    destination: (i64, i64),
    search_radius_m: u32,
    max_candidates: usize,
    max_alternatives: usize,
}

/// Cached plan entry.
type PlanEntry = Arc<SearchResult>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Decimal places of latitude/longitude kept in the key.
    pub coord_precision: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
            coord_precision: 5,
        }
    }
}

/// Cache for coordinate plan results.
pub struct PlanCache {
    plans: MokaCache<PlanKey, PlanEntry>,

    /// 10^coord_precision
    scale: f64,
}

impl PlanCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let plans = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            plans,
            scale: 10f64.powi(config.coord_precision as i32),
        }
    }

    fn quantise(&self, value: f64) -> i64 {
        (value * self.scale).round() as i64
    }

    /// Key for a request.
    pub fn key(&self, request: &SearchRequest) -> PlanKey {
        PlanKey {
            origin: (
                self.quantise(request.origin.lat),
                self.quantise(request.origin.lon),
            ),
            destination: (
                self.quantise(request.destination.lat),
                self.quantise(request.destination.lon),
            ),
            search_radius_m: request.search_radius_m.round() as u32,
            max_candidates: request.max_candidates,
            max_alternatives: request.max_alternatives,
        }
    }

    /// Get a cached plan.
    pub async fn get(&self, key: &PlanKey) -> Option<PlanEntry> {
        self.plans.get(key).await
    }

    /// Insert a plan into the cache.
    ///
    /// Plans cut short by the request deadline are not stored. Returns
    /// whether the plan was stored.
    pub async fn insert(&self, key: PlanKey, entry: PlanEntry) -> bool {
        if entry.diagnostics.deadline_expired {
            return false;
        }
        self.plans.insert(key, entry).await;
        true
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.plans.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.plans.invalidate_all();
    }
}
