//! Web layer for the matatu route planner.
//!
//! Provides HTTP endpoints for routing between named stops and between
//! coordinates.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
