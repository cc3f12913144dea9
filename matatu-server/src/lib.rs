//! Matatu route planner server.
//!
//! Answers "which matatus do I take from here to there?" over a graph of
//! Nairobi stops, preferring itineraries with few transfers and falling
//! back to changing at a town-centre hub.

pub mod cache;
pub mod graph;
pub mod oracle;
pub mod planner;
pub mod web;
