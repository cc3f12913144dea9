use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use matatu_server::cache::CacheConfig;
use matatu_server::graph::{GraphSnapshot, TransitGraph};
use matatu_server::planner::{Classifier, RoutingConfig};
use matatu_server::web::{AppState, create_router};

const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matatu_server=info,tower_http=info")),
        )
        .init();

    let graph_path = std::env::var("MATATU_GRAPH").expect("MATATU_GRAPH must name a graph snapshot");

    let config = match std::env::var("MATATU_CONFIG") {
        Ok(path) => RoutingConfig::from_json_file(&path).expect("Failed to load routing config"),
        Err(_) => {
            info!("MATATU_CONFIG not set, using default routing config");
            RoutingConfig::default()
        }
    };

    let snapshot = GraphSnapshot::load(&graph_path).expect("Failed to load graph snapshot");
    let mut builder = snapshot.into_builder();

    // Raw timetable exports lack transfer and walking edges
    if std::env::var("MATATU_SYNTHESIZE").is_ok_and(|v| v == "1") {
        let classifier = Classifier::new(&config);
        builder = builder
            .with_transfer_edges(&classifier)
            .with_walking_edges(&classifier);
    }

    let graph: TransitGraph = builder.build().expect("Invalid graph snapshot");
    info!(
        stops = graph.stop_count(),
        edges = graph.edge_count(),
        routes = graph.route_count(),
        path = %graph_path,
        "Loaded graph"
    );
    if graph.edge_count() == 0 {
        warn!("Graph has no edges, every search will fail");
    }

    let state = AppState::new(graph, config, &CacheConfig::default());
    let app = create_router(state);

    let bind = std::env::var("MATATU_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let addr: SocketAddr = bind.parse().expect("MATATU_BIND must be a socket address");

    info!(%addr, "Matatu route planner listening");
    info!("  GET /health                 - Health check");
    info!("  GET /routes                 - Routes between named stops");
    info!("  GET /routes/alternatives    - Alternative routes between named stops");
    info!("  GET /routes/by-coordinates  - Routes between coordinates");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
