//! Routing configuration for the itinerary planner.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::cost::CostPolicy;
use super::score::ScoringWeights;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Constant walking speeds, in metres per minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkingSpeeds {
    /// Speed at stops inside the CBD.
    pub cbd_m_per_min: f64,

    /// Speed everywhere else.
    pub default_m_per_min: f64,
}

impl WalkingSpeeds {
    /// Whole minutes needed to walk `distance_m`.
    pub fn minutes(&self, distance_m: f64, in_cbd: bool) -> u32 {
        let speed = if in_cbd {
            self.cbd_m_per_min
        } else {
            self.default_m_per_min
        };
        if speed <= 0.0 || !distance_m.is_finite() {
            return 0;
        }
        (distance_m.max(0.0) / speed).floor() as u32
    }
}

impl Default for WalkingSpeeds {
    fn default() -> Self {
        Self {
            cbd_m_per_min: 100.0,
            default_m_per_min: 80.0,
        }
    }
}

/// Failure to load a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration parameters for itinerary search.
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Centre of the hub search used by the fallback.
    pub town_center: Coordinate,

    /// Centre of the central business district.
    pub cbd_center: Coordinate,

    /// Stops within this distance of `cbd_center` are CBD-adjacent (metres).
    pub cbd_radius_m: f64,

    /// Half-width of the CBD bounding box, in degrees on both axes.
    pub cbd_box_deg: f64,

    /// Radius around `town_center` searched for hubs (metres).
    pub town_radius_m: f64,

    /// Distinct routes needed for a stop to count as a hub.
    pub minor_hub_routes: usize,

    /// Distinct routes needed for the major-hub transfer band.
    pub major_hub_routes: usize,

    /// Maximum hubs tried by the fallback.
    pub max_hubs: usize,

    /// Stops near the town centre inspected when looking for hubs.
    pub hub_scan_limit: usize,

    /// Default candidate search radius around each endpoint (metres).
    pub search_radius_m: f64,

    /// Default number of candidate stops per endpoint.
    pub max_candidates: usize,

    /// Default number of itineraries returned.
    pub max_alternatives: usize,

    /// Direct results with at most this many transfers end the search.
    pub max_direct_transfers: usize,

    /// Cost added when two legs are joined at a hub.
    pub hub_transfer_penalty: f64,

    /// Wall-clock budget for one request (milliseconds).
    pub request_timeout_ms: u64,

    pub walking: WalkingSpeeds,
    pub cost: CostPolicy,
    pub scoring: ScoringWeights,
}

impl RoutingConfig {
    /// Load a config from a JSON file, filling unset fields with defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Returns the request deadline as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            town_center: Coordinate::new(-1.2848863468680394, 36.82599683396185),
            cbd_center: Coordinate::new(-1.286, 36.817),
            cbd_radius_m: 2000.0,
            cbd_box_deg: 0.018, // ~2 km
            town_radius_m: 2500.0,
            minor_hub_routes: 3,
            major_hub_routes: 5,
            max_hubs: 5,
            hub_scan_limit: 50,
            search_radius_m: 500.0,
            max_candidates: 5,
            max_alternatives: 3,
            max_direct_transfers: 1,
            hub_transfer_penalty: 15.0,
            request_timeout_ms: 10_000,
            walking: WalkingSpeeds::default(),
            cost: CostPolicy::default(),
            scoring: ScoringWeights::default(),
        }
    }
}
