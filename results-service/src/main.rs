mod auth_middleware;
mod config;
mod metrics;
mod refresh;
mod results;
mod state;
mod types;
mod utils;

use std::net::SocketAddr;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use auth_middleware::auth_middleware;
use config::ServiceConfig;
use refresh::{handle_refresh, refresh};
use results::*;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting xGov Results Service");

    let config = ServiceConfig::from_env();
    let session = config.session_config()?;
    info!(
        "Serving session {} (app {}) from {}",
        session.session, session.app_id, config.indexer_url
    );

    let state = AppState::new(session, config.client()?, config.refresh_token.clone());
    if state.refresh_token.is_none() {
        warn!("REFRESH_AUTH_TOKEN is not set, /refresh is open");
    }

    // Data endpoints answer 503 until a refresh succeeds
    if let Err(e) = refresh(&state).await {
        warn!("Initial refresh failed, starting without results: {}", e);
    }

    let app = Router::new()
        .route("/healthz", get(health_check))
        .route("/meta", get(get_meta))
        .route("/metrics", get(get_metrics))
        .route("/results", get(get_results))
        .route("/votes", get(get_votes))
        .route("/voters", get(get_voters))
        .route("/votes.csv", get(get_votes_csv))
        .route("/voters.csv", get(get_voters_csv))
        .route("/governors.csv", get(get_governors_csv))
        .route("/voter/{address}", get(get_voter))
        .route("/proposal/{id}", get(get_proposal_text))
        .route("/refresh", post(handle_refresh))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Health check endpoint
async fn health_check() -> &'static str {
    info!("GET /healthz - Health check requested");
    "ok"
}

async fn get_meta(State(state): State<AppState>) -> Json<Value> {
    info!("GET /meta - Metadata requested");
    let snapshot = state.current().await;

    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "gitHash": option_env!("RESULTS_BUILD_GIT_HASH"),
        "buildTimeUnix": option_env!("RESULTS_BUILD_TIME_UNIX"),
        "session": state.session.session,
        "appId": state.session.app_id,
        "refreshedAt": snapshot.as_ref().map(|s| s.refreshed_at.to_rfc3339()),
        "stats": snapshot.as_ref().map(|s| &s.data.stats),
    }))
}

async fn get_metrics() -> Json<Value> {
    info!("GET /metrics - Metrics requested");
    Json(metrics::snapshot_as_json())
}
