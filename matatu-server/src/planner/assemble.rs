//! Folding raw path traces into rider-facing segments.
//!
//! Trace rows carry the edge used to leave their stop, and the final row
//! carries the virtual closing edge. A segment therefore changes route at
//! the stop where the new route's edge starts: that stop is where the
//! rider alights the old route and boards the new one, so it closes the
//! old segment and opens the next.

use std::collections::BTreeSet;

use tracing::trace;

use crate::graph::{EdgeType, GraphView, Stop};
use crate::oracle::PathTrace;

use super::classify::Classifier;

/// One uninterrupted ride on a single route.
///
/// On a route change the shared stop is the `alight_stop` of this segment
/// and the `board_stop` of the next, so consecutive segments meet at a
/// stop rather than leaving a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub route_id: String,
    pub board_stop: String,
    pub alight_stop: String,

    /// Stops visited in order, without repeats.
    pub stops: Vec<String>,

    /// Stops of this segment inside the CBD.
    pub cbd_stops: BTreeSet<String>,
}

impl Segment {
    fn open(route_id: String, stop: &str) -> Self {
        Self {
            route_id,
            board_stop: stop.to_string(),
            alight_stop: stop.to_string(),
            stops: vec![stop.to_string()],
            cbd_stops: BTreeSet::new(),
        }
    }

    fn visit(&mut self, stop: &str) {
        if !self.stops.iter().any(|s| s == stop) {
            self.stops.push(stop.to_string());
        }
    }

    fn close(mut self) -> Self {
        if let Some(last) = self.stops.last() {
            self.alight_stop = last.clone();
        }
        self
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }
}

/// A trace row resolved against the graph.
#[derive(Debug, Clone, Copy)]
struct TraceRow<'a> {
    stop: &'a Stop,
    route_id: Option<&'a str>,
    edge_type: Option<EdgeType>,
    closing: bool,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    NoSegment,
    InSegment(Segment),
}

#[derive(Debug, Default)]
struct Assembler {
    state: State,
    segments: Vec<Segment>,
    last_valid_route: Option<String>,
}

impl Assembler {
    fn resolve_route(&self, row: &TraceRow<'_>) -> Option<String> {
        if let Some(route_id) = row.route_id {
            return Some(route_id.to_string());
        }
        if row.closing {
            if let Some(route_id) = &self.last_valid_route {
                trace!(stop = %row.stop.name, %route_id, "Closing edge inherits route");
                return Some(route_id.clone());
            }
        }
        match &self.state {
            State::InSegment(open) => Some(open.route_id.clone()),
            State::NoSegment => None,
        }
    }

    fn push(&mut self, row: TraceRow<'_>, classifier: &Classifier) {
        let name = row.stop.name.as_str();
        if name.is_empty() {
            return;
        }
        if row.edge_type == Some(EdgeType::Transfer) {
            return;
        }

        let Some(route_id) = self.resolve_route(&row) else {
            trace!(stop = %name, "Skipping stop with no attributable route");
            return;
        };
        if !row.closing {
            self.last_valid_route = Some(route_id.clone());
        }

        let mut segment = match std::mem::take(&mut self.state) {
            State::NoSegment => Segment::open(route_id, name),
            State::InSegment(mut open) if open.route_id != route_id => {
                open.visit(name);
                self.segments.push(open.close());
                Segment::open(route_id, name)
            }
            State::InSegment(mut open) => {
                open.visit(name);
                open
            }
        };

        if classifier.is_cbd(row.stop) {
            segment.cbd_stops.insert(name.to_string());
        }
        self.state = State::InSegment(segment);
    }

    fn finish(mut self) -> Vec<Segment> {
        if let State::InSegment(open) = self.state {
            self.segments.push(open.close());
        }
        self.segments
    }
}

/// Fold a path trace into segments.
///
/// Returns an empty list when no row can be attributed to a route; the
/// caller discards such a trace.
pub fn assemble<G: GraphView + ?Sized>(
    graph: &G,
    trace: &PathTrace,
    classifier: &Classifier,
) -> Vec<Segment> {
    let mut assembler = Assembler::default();

    for step in &trace.steps {
        // Dangling node references have no stop to report
        let Some(stop) = graph.stop(step.node) else {
            continue;
        };
        let edge = step.edge.edge_id().and_then(|id| graph.edge(id));

        assembler.push(
            TraceRow {
                stop,
                route_id: edge.and_then(|e| e.route_id.as_deref()),
                edge_type: edge.map(|e| e.edge_type),
                closing: step.edge.is_closing(),
            },
            classifier,
        );
    }

    assembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeId, GraphBuilder, NodeIndex, TransitGraph};

    // Outside the CBD unless named otherwise
    fn stop(i: usize, name: &str) -> Stop {
        Stop::new(format!("S{i}"), NodeIndex(i), name, -1.20 - 0.001 * i as f64, 36.70)
    }

    fn trace(nodes: &[usize], edges: &[usize]) -> PathTrace {
        let nodes: Vec<NodeIndex> = nodes.iter().copied().map(NodeIndex).collect();
        let edges: Vec<EdgeId> = edges.iter().copied().map(EdgeId).collect();
        let costs = vec![1.0; edges.len()];
        PathTrace::from_parts(&nodes, &edges, &costs)
    }

    fn names(segment: &Segment) -> Vec<&str> {
        segment.stops.iter().map(String::as_str).collect()
    }

    /// A(0) -R1-> B(1) -R1-> C(2) -R2-> D(3) -R2-> E(4), plus extras.
    fn corridor() -> TransitGraph {
        GraphBuilder::new()
            .stop(stop(0, "Alpha"))
            .stop(stop(1, "Bravo"))
            .stop(stop(2, "Charlie"))
            .stop(stop(3, "Delta"))
            .stop(stop(4, "Echo"))
            .stop(stop(5, "Kencom"))
            .stop(stop(6, ""))
            .edge(Edge::new(NodeIndex(0), NodeIndex(1), 1.0, EdgeType::Direct).on_route("R1"))
            .edge(Edge::new(NodeIndex(1), NodeIndex(2), 1.0, EdgeType::Direct).on_route("R1"))
            .edge(Edge::new(NodeIndex(2), NodeIndex(3), 1.0, EdgeType::Direct).on_route("R2"))
            .edge(Edge::new(NodeIndex(3), NodeIndex(4), 1.0, EdgeType::Direct).on_route("R2"))
            .edge(Edge::new(NodeIndex(2), NodeIndex(2), 5.0, EdgeType::Transfer))
            .edge(Edge::new(NodeIndex(1), NodeIndex(2), 3.0, EdgeType::Walking))
            .edge(Edge::new(NodeIndex(4), NodeIndex(5), 1.0, EdgeType::Direct).on_route("R2"))
            .edge(Edge::new(NodeIndex(0), NodeIndex(6), 1.0, EdgeType::Direct).on_route("R1"))
            .build()
            .unwrap()
    }

    #[test]
    fn single_route_is_one_segment() {
        // Closing edge at C inherits R1 and folds into the open segment
        let graph = corridor();
        let segments = assemble(&graph, &trace(&[0, 1, 2], &[0, 1]), &Classifier::default());

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].route_id, "R1");
        assert_eq!(segments[0].board_stop, "Alpha");
        assert_eq!(segments[0].alight_stop, "Charlie");
        assert_eq!(names(&segments[0]), vec!["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn route_change_splits_at_shared_stop() {
        let graph = corridor();
        let segments = assemble(
            &graph,
            &trace(&[0, 1, 2, 3, 4], &[0, 1, 2, 3]),
            &Classifier::default(),
        );

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].route_id, "R1");
        assert_eq!(segments[0].alight_stop, "Charlie");
        assert_eq!(segments[1].route_id, "R2");
        assert_eq!(segments[1].board_stop, "Charlie");
        assert_eq!(segments[1].alight_stop, "Echo");
        assert_eq!(names(&segments[1]), vec!["Charlie", "Delta", "Echo"]);
    }

    #[test]
    fn transfer_rows_are_skipped() {
        // A -R1-> B -R1-> C =transfer=> C -R2-> D
        let graph = corridor();
        let segments = assemble(
            &graph,
            &trace(&[0, 1, 2, 2, 3], &[0, 1, 4, 2]),
            &Classifier::default(),
        );

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].alight_stop, "Charlie");
        assert_eq!(segments[1].board_stop, "Charlie");
        assert_eq!(names(&segments[1]), vec!["Charlie", "Delta"]);
    }

    #[test]
    fn routeless_edge_continues_open_segment() {
        // Walking edge B -> C has no route and must not start a segment
        let graph = corridor();
        let segments = assemble(
            &graph,
            &trace(&[0, 1, 2, 3], &[0, 5, 2]),
            &Classifier::default(),
        );

        assert_eq!(segments.len(), 2);
        assert_eq!(names(&segments[0]), vec!["Alpha", "Bravo", "Charlie"]);
        assert_eq!(segments[1].route_id, "R2");
    }

    #[test]
    fn routeless_row_without_open_segment_is_skipped() {
        let graph = corridor();
        let segments = assemble(&graph, &trace(&[1, 2, 3], &[5, 2]), &Classifier::default());

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].board_stop, "Charlie");
        assert_eq!(segments[0].alight_stop, "Delta");
    }

    #[test]
    fn closing_row_with_no_route_history_is_dropped() {
        let graph = corridor();
        let segments = assemble(&graph, &trace(&[1, 2], &[5]), &Classifier::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn empty_names_yield_no_segments() {
        let graph = corridor();
        let segments = assemble(&graph, &trace(&[6], &[]), &Classifier::default());
        assert!(segments.is_empty());

        let segments = assemble(&graph, &PathTrace::default(), &Classifier::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn empty_name_rows_are_skipped_mid_trace() {
        let graph = corridor();
        let segments = assemble(&graph, &trace(&[0, 6], &[7]), &Classifier::default());

        assert_eq!(segments.len(), 1);
        assert_eq!(names(&segments[0]), vec!["Alpha"]);
    }

    #[test]
    fn unknown_nodes_are_skipped() {
        let graph = corridor();
        let segments = assemble(&graph, &trace(&[0, 1, 42], &[0, 1]), &Classifier::default());

        assert_eq!(segments.len(), 1);
        assert_eq!(names(&segments[0]), vec!["Alpha", "Bravo"]);
    }

    #[test]
    fn cbd_stops_are_tracked() {
        let graph = corridor();
        let segments = assemble(&graph, &trace(&[3, 4, 5], &[3, 6]), &Classifier::default());

        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0].cbd_stops.iter().collect::<Vec<_>>(),
            vec!["Kencom"]
        );
    }

    #[test]
    fn repeated_stop_names_collapse() {
        let graph = GraphBuilder::new()
            .stop(stop(0, "Kangemi"))
            .stop(stop(1, "Kangemi"))
            .stop(stop(2, "Uthiru"))
            .edge(Edge::new(NodeIndex(0), NodeIndex(1), 1.0, EdgeType::MultiHop).on_route("R1"))
            .edge(Edge::new(NodeIndex(1), NodeIndex(2), 1.0, EdgeType::MultiHop).on_route("R1"))
            .build()
            .unwrap();
        let segments = assemble(&graph, &trace(&[0, 1, 2], &[0, 1]), &Classifier::default());

        assert_eq!(names(&segments[0]), vec!["Kangemi", "Uthiru"]);
        assert_eq!(segments[0].stop_count(), 2);
    }
}
