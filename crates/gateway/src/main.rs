//! Smart Legal contracts API
//!
//! The main entry point for contract requests.
//! Handles:
//! - Caller identification
//! - Contract CRUD, analysis and generation routing
//! - Token balance and usage history
//! - Observability (logging, metrics)

mod handlers;
mod middleware;

#[cfg(test)]
mod tests;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    routing::{get, post},
    Router,
};
use smartlegal_common::{
    config::AppConfig,
    db::{sample_clauses, ContractStore, DbPool, MemoryStore, Repository},
    lifecycle::shutdown_signal,
    metrics, observability, LegalServices, LlmGateway,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: LegalServices,
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

    info!("Starting Smart Legal contracts API v{}", smartlegal_common::VERSION);

    // Initialize metrics
    match config.observability.metrics_port {
        0 => metrics::register_metrics(),
        port => metrics::install_exporter(port)?,
    }

    let config = Arc::new(config);
    let state = build_state(config.clone()).await?;

    // Build the router
    let app = create_router(state);

    // Start the server
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wire the store and the AI gateway into the service layer
async fn build_state(config: Arc<AppConfig>) -> smartlegal_common::Result<AppState> {
    let store: Arc<dyn ContractStore> = if config.uses_memory_store() {
        warn!("Using the in-memory store; data is lost on restart");
        Arc::new(MemoryStore::with_clauses(sample_clauses()))
    } else {
        info!("Connecting to database...");
        let pool = DbPool::new(&config.database).await?;
        if config.database.run_migrations {
            pool.run_migrations().await?;
        }
        Arc::new(Repository::new(pool))
    };

    let llm = LlmGateway::from_config(&config.llm)?;
    if llm.is_configured() {
        info!(provider = llm.provider_name(), model = %config.llm.model, "AI gateway ready");
    } else {
        warn!("No AI service key configured; analysis and generation will report it");
    }

    Ok(AppState {
        services: LegalServices::new(store, Arc::new(llm), config.billing.clone()),
        config,
    })
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id,
            user_id = tracing::field::Empty,
        )
    });

    let timeout = state.config.request_timeout();

    let api_routes = Router::new()
        // Contracts
        .route(
            "/contracts",
            get(handlers::contracts::list_contracts).post(handlers::contracts::create_contract),
        )
        .route("/contracts/generate", post(handlers::contracts::generate_contract))
        .route(
            "/contracts/{id}",
            get(handlers::contracts::get_contract)
                .patch(handlers::contracts::update_contract)
                .delete(handlers::contracts::delete_contract),
        )
        .route("/contracts/{id}/run-analysis", post(handlers::contracts::run_analysis))
        .route("/contracts/{id}/archive", post(handlers::contracts::archive_contract))
        // Knowledge base
        .route("/clauses", get(handlers::clauses::retrieve_clauses))
        // Account
        .route("/profile", get(handlers::account::get_profile))
        .route("/service-requests", get(handlers::account::list_service_requests));

    let mut app = Router::new()
        // Health endpoints (no identity)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .route_layer(axum::middleware::from_fn(middleware::metrics::track_metrics));

    if let Some(timeout) = timeout {
        app = app.layer(TimeoutLayer::new(timeout));
    }

    // Outermost last: the id is set before tracing and propagation see the request
    app.layer(cors)
        .layer(trace)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// Allow the configured origins, or any origin when none are listed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
