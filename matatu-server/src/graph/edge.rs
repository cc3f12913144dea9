//! Edge types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NodeIndex;

/// Position of an edge in the graph's edge table.
///
/// Edge ids double as the oracle's tie-break order: among equal-cost
/// alternatives the edge inserted first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Classification of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Consecutive stops on one trip.
    Direct,
    /// Shortcut over several consecutive stops on one trip.
    MultiHop,
    /// Same-location mode change at a stop (the only legal self-loop).
    Transfer,
    /// Walking link between nearby stops.
    Walking,
    /// Synthetic destination-completion link.
    Destination,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Direct => "direct",
            EdgeType::MultiHop => "multi_hop",
            EdgeType::Transfer => "transfer",
            EdgeType::Walking => "walking",
            EdgeType::Destination => "destination",
        }
    }
}

/// Which ways an edge may be traversed.
///
/// `Forward` runs source to target at `cost`, `Reverse` runs target to
/// source at `reverse_cost`, `Both` allows either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
    Both,
}

impl Direction {
    pub fn allows_forward(&self) -> bool {
        matches!(self, Direction::Forward | Direction::Both)
    }

    pub fn allows_reverse(&self) -> bool {
        matches!(self, Direction::Reverse | Direction::Both)
    }
}

fn default_hop_count() -> u32 {
    1
}

/// A directed, costed connection between two stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub cost: f64,
    pub reverse_cost: f64,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default = "default_hop_count")]
    pub hop_count: u32,
    pub edge_type: EdgeType,
    #[serde(default)]
    pub direction: Direction,
}

impl Edge {
    /// Create a forward edge with symmetric cost and a single hop.
    pub fn new(source: NodeIndex, target: NodeIndex, cost: f64, edge_type: EdgeType) -> Self {
        Self {
            source,
            target,
            cost,
            reverse_cost: cost,
            route_id: None,
            trip_id: None,
            hop_count: 1,
            edge_type,
            direction: Direction::Forward,
        }
    }

    /// Set the route this edge belongs to.
    pub fn on_route(mut self, route_id: impl Into<String>) -> Self {
        self.route_id = Some(route_id.into());
        self
    }

    /// Set the trip this edge was derived from.
    pub fn on_trip(mut self, trip_id: impl Into<String>) -> Self {
        self.trip_id = Some(trip_id.into());
        self
    }

    pub fn with_hops(mut self, hop_count: u32) -> Self {
        self.hop_count = hop_count;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_reverse_cost(mut self, reverse_cost: f64) -> Self {
        self.reverse_cost = reverse_cost;
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Returns true if either endpoint is `node`.
    pub fn touches(&self, node: NodeIndex) -> bool {
        self.source == node || self.target == node
    }
}
