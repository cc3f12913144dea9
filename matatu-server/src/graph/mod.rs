//! Transit graph model.
//!
//! Stops are nodes addressed by a dense [`NodeIndex`]; edges form a
//! directed multigraph (several routes may join the same pair of stops).
//! The graph is immutable once built and is read through [`GraphView`].

mod edge;
mod error;
mod snapshot;
mod stop;
mod synthesis;
mod transit;
mod view;

pub use edge::{Direction, Edge, EdgeId, EdgeType};
pub use error::GraphError;
pub use snapshot::{GraphSnapshot, RouteRecord};
pub use stop::{NodeIndex, Stop, haversine_m};
pub use synthesis::{transfer_cost, transfer_edges, walking_cost, walking_edges};
pub use transit::{GraphBuilder, TransitGraph};
pub use view::{GraphView, NearbyStop};
