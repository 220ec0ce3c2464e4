//! Re-running the pipeline and swapping in its results

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use cli::error::SourceError;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::metrics::{record_refresh_outcome, record_stats, RefreshOutcome};
use crate::state::{AppState, Snapshot};

/// Fetch the session and replace the current snapshot. Refreshes queue on
/// the refresh lock. On failure the previous snapshot stays in place.
pub async fn refresh(state: &AppState) -> Result<Arc<Snapshot>, SourceError> {
    let _guard = state.refresh_lock.lock().await;
    info!("Refreshing session {}", state.session.session);

    match cli::load(&state.client, &state.session).await {
        Ok(data) => {
            record_refresh_outcome(RefreshOutcome::Success);
            record_stats(&data.stats);
            let snapshot = state.replace(data).await;
            info!(
                "Session {} refreshed: {} voters, {} votes",
                state.session.session,
                snapshot.data.voters.len(),
                snapshot.data.votes.len()
            );
            Ok(snapshot)
        }
        Err(e) => {
            record_refresh_outcome(RefreshOutcome::SourceFailure);
            error!("Refresh of session {} failed: {}", state.session.session, e);
            Err(e)
        }
    }
}

pub async fn handle_refresh(State(state): State<AppState>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!("POST /refresh - Refresh requested");
    match refresh(&state).await {
        Ok(snapshot) => Ok(Json(json!({
            "status": "ok",
            "refreshedAt": snapshot.refreshed_at.to_rfc3339(),
            "stats": snapshot.data.stats,
        }))),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}
