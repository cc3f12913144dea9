//! Stop types.

use std::fmt;

use geo::{Distance, HaversineMeasure, Point};
use serde::{Deserialize, Serialize};

/// Dense integer handle of a stop inside the live graph.
///
/// Assigned once when the graph is built and stable for the graph's
/// lifetime. Handles are contiguous: a graph with `n` stops uses `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A physical boarding/alighting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// External, human-meaningful identifier (unique).
    pub stop_id: String,

    /// Internal graph handle (unique, contiguous).
    pub node_index: NodeIndex,

    /// Display name.
    pub name: String,

    pub lat: f64,
    pub lon: f64,
}

impl Stop {
    /// Create a new stop.
    pub fn new(
        stop_id: impl Into<String>,
        node_index: NodeIndex,
        name: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            stop_id: stop_id.into(),
            node_index,
            name: name.into(),
            lat,
            lon,
        }
    }

    /// The stop location as a geo point (x = lon, y = lat).
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Great-circle distance in metres from this stop to a coordinate.
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        haversine_m(self.lat, self.lon, lat, lon)
    }
}

/// Mean Earth radius used for every stop distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const EARTH: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_M);

/// Great-circle distance in metres between two coordinates.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    EARTH.distance(Point::new(lon1, lat1), Point::new(lon2, lat2))
}
