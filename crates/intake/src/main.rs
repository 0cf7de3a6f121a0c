//! Smart Legal manual intake API
//!
//! Accepts manual service requests and lists them back. Runs without a
//! document store too: submissions are then acknowledged with a mock id and
//! nothing is persisted.

mod handlers;


use axum::{routing::get, Router};
use smartlegal_common::{
    config::AppConfig,
    docstore::{ManualRequestStore, RedisDocumentStore},
    lifecycle::shutdown_signal,
    metrics, observability,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct IntakeState {
    /// `None` runs the service in degraded mode
    pub store: Option<Arc<dyn ManualRequestStore>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    observability::init_tracing(&config.observability);

    info!("Starting Smart Legal intake API v{}", smartlegal_common::VERSION);

    // Initialize metrics; give each service its own port when both run on one host
    match config.observability.metrics_port {
        0 => metrics::register_metrics(),
        port => metrics::install_exporter(port)?,
    }

    let config = Arc::new(config);
    let state = IntakeState {
        store: connect_store(&config).await,
    };

    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.intake_port))
            .await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Connect the document store, or fall back to degraded mode
async fn connect_store(config: &AppConfig) -> Option<Arc<dyn ManualRequestStore>> {
    let Some(url) = config.document_store.url.as_deref() else {
        warn!("No document store configured; running in degraded mode");
        return None;
    };

    match RedisDocumentStore::connect(url, &config.document_store).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!(error = %e, "Document store unavailable; running in degraded mode");
            None
        }
    }
}

fn create_router(state: IntakeState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let manual = get(handlers::manual::list_requests).post(handlers::manual::submit_request);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/requests/manual", manual.clone())
        .route("/requests/manual/", manual)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
