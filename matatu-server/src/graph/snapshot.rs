//! JSON graph snapshots.
//!
//! The graph is built offline from timetable data and shipped as a single
//! JSON document:
//!
//! ```json
//! {
//!   "stops":  [{"stop_id": "0001KEN", "node_index": 0, "name": "Kencom", "lat": -1.2864, "lon": 36.825}],
//!   "edges":  [{"source": 0, "target": 1, "cost": 4.0, "reverse_cost": 4.0, "route_id": "R46", "edge_type": "direct"}],
//!   "routes": [{"route_id": "R46", "short_name": "46"}]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::transit::{GraphBuilder, TransitGraph};
use super::{Edge, Stop};

/// Display information for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_id: String,
    pub short_name: String,
}

/// Serialized form of a transit graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub stops: Vec<Stop>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

impl GraphSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// A builder holding the snapshot's stops, edges and route labels.
    pub fn into_builder(self) -> GraphBuilder {
        self.routes.into_iter().fold(
            GraphBuilder::new().stops(self.stops).edges(self.edges),
            |builder, route| builder.route(route.route_id, route.short_name),
        )
    }
}

impl TransitGraph {
    /// Validate a snapshot into a graph.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        snapshot.into_builder().build()
    }
}
