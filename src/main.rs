//! adserve-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, and a
//! background task purging expired ad events.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use adserve_gateway::api;
use adserve_gateway::app_state::AppState;
use adserve_gateway::config::ServingConfig;
use adserve_gateway::domain::EventBus;
use adserve_gateway::eligibility::AntiTargetingResource;
use adserve_gateway::persistence::SqliteStore;
use adserve_gateway::service::{AdServingService, ServingParams};
use adserve_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ServingConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting adserve-gateway");

    // Build storage and domain layer
    let store = SqliteStore::connect(&config.database_url, config.database_max_connections).await?;
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build the serving orchestrator
    let mut serving =
        AdServingService::new(store, event_bus.clone(), ServingParams::from(&config));
    if let Some(path) = &config.anti_targeting_path {
        let resource = AntiTargetingResource::from_json_file(path)?;
        serving = serving.with_anti_targeting(resource);
        tracing::info!(path = %path, "loaded anti-targeting resource");
    }
    let serving = Arc::new(serving);

    // Periodic expired-event purge
    if config.purge_interval_secs > 0 {
        let purger = Arc::clone(&serving);
        let interval = Duration::from_secs(config.purge_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                if let Err(error) = purger.purge_expired_ad_events().await {
                    tracing::warn!(error = %error, "expired ad event purge failed");
                }
            }
        });
    }

    // Build application state
    let app_state = AppState {
        serving,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
