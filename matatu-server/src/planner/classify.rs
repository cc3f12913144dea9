//! Hub and CBD classification of stops.

use crate::graph::{GraphView, NodeIndex, Stop, haversine_m};

use super::config::{Coordinate, RoutingConfig};

/// Name fragments of well-known central-district landmarks.
pub const CBD_LANDMARKS: &[&str] = &[
    "kencom",
    "odeon",
    "gpo",
    "hilton",
    "bus station",
    "central",
    "nation",
    "city hall",
    "parliament",
    "uhuru",
    "archives",
    "teleposta",
    "ambassador",
    "norfolk",
    "stanley",
    "jeevanjee",
    "tom mboya",
    "ronald ngala",
    "river road",
    "moi avenue",
    "kenyatta avenue",
    "haile selassie",
    "university way",
    "museum hill",
    "globe",
    "integrity",
    "anniversary",
    "khoja",
];

/// How strongly a stop acts as a transfer point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HubTier {
    None,
    Minor,
    Major,
}

/// Tags stops as CBD or hub.
#[derive(Debug, Clone)]
pub struct Classifier {
    cbd_center: Coordinate,
    cbd_radius_m: f64,
    cbd_box_deg: f64,
    minor_hub_routes: usize,
    major_hub_routes: usize,
}

impl Classifier {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            cbd_center: config.cbd_center,
            cbd_radius_m: config.cbd_radius_m,
            cbd_box_deg: config.cbd_box_deg,
            minor_hub_routes: config.minor_hub_routes,
            major_hub_routes: config.major_hub_routes,
        }
    }

    /// True if the name contains a CBD landmark (case-insensitive).
    pub fn is_cbd_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        CBD_LANDMARKS.iter().any(|landmark| lower.contains(landmark))
    }

    /// True if the coordinate lies inside the CBD bounding box.
    pub fn in_cbd_box(&self, lat: f64, lon: f64) -> bool {
        (lat - self.cbd_center.lat).abs() <= self.cbd_box_deg
            && (lon - self.cbd_center.lon).abs() <= self.cbd_box_deg
    }

    /// CBD membership by landmark name or bounding box.
    ///
    /// A stop with an empty name is never CBD.
    pub fn is_cbd(&self, stop: &Stop) -> bool {
        if stop.name.is_empty() {
            return false;
        }
        self.is_cbd_name(&stop.name) || self.in_cbd_box(stop.lat, stop.lon)
    }

    /// True if the stop lies within the CBD radius of the CBD centre.
    pub fn is_cbd_adjacent(&self, stop: &Stop) -> bool {
        haversine_m(stop.lat, stop.lon, self.cbd_center.lat, self.cbd_center.lon)
            <= self.cbd_radius_m
    }

    /// Band a distinct-route count into a hub tier.
    pub fn tier_for_routes(&self, route_count: usize) -> HubTier {
        if route_count >= self.major_hub_routes {
            HubTier::Major
        } else if route_count >= self.minor_hub_routes {
            HubTier::Minor
        } else {
            HubTier::None
        }
    }

    pub fn hub_tier<G: GraphView + ?Sized>(&self, graph: &G, node: NodeIndex) -> HubTier {
        self.tier_for_routes(graph.incident_route_count(node))
    }

    /// True for at least a minor hub.
    pub fn is_hub<G: GraphView + ?Sized>(&self, graph: &G, node: NodeIndex) -> bool {
        self.hub_tier(graph, node) >= HubTier::Minor
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&RoutingConfig::default())
    }
}
