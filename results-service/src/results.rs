//! Read-only endpoints over the current snapshot

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use cli::{
    export::{governors_csv, votes_csv, voters_csv},
    VoteRecord,
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::metrics::record_voter_not_found;
use crate::state::{AppState, Snapshot};
use crate::types::VotesQuery;
use crate::utils::{csv_response, parse_effect};

async fn snapshot(state: &AppState) -> Result<Arc<Snapshot>, StatusCode> {
    state.current().await.ok_or_else(|| {
        info!("No results loaded yet");
        StatusCode::SERVICE_UNAVAILABLE
    })
}

pub async fn get_results(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    info!("GET /results - Results requested");
    let snapshot = snapshot(&state).await?;
    let data = &snapshot.data;

    Ok(Json(json!({
        "session": data.session.session,
        "title": data.metadata.title,
        "refreshedAt": snapshot.refreshed_at.to_rfc3339(),
        "proposals": data.results,
        "participation": data.participation,
    })))
}

pub async fn get_votes(
    State(state): State<AppState>,
    Query(query): Query<VotesQuery>,
) -> Result<Json<Vec<VoteRecord>>, StatusCode> {
    info!("GET /votes - Votes requested");
    let effect = query.effect.as_deref().map(parse_effect).transpose()?;
    let snapshot = snapshot(&state).await?;

    let votes = snapshot
        .data
        .votes
        .iter()
        .filter(|v| query.proposal.as_ref().map_or(true, |p| &v.proposal_id == p))
        .filter(|v| effect.map_or(true, |e| v.effect == Some(e)))
        .cloned()
        .collect();

    Ok(Json(votes))
}

pub async fn get_voters(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    info!("GET /voters - Voters requested");
    let snapshot = snapshot(&state).await?;
    Ok(Json(json!(snapshot.data.voters)))
}

pub async fn get_voter(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    info!("GET /voter/{} - Voter requested", address);
    let snapshot = snapshot(&state).await?;

    let Some(voter) = snapshot.data.voter(&address) else {
        info!("{} did not vote", address);
        record_voter_not_found();
        return Err(StatusCode::NOT_FOUND);
    };

    Ok(Json(json!({
        "voter": voter,
        "votes": snapshot.data.votes_by(&address),
    })))
}

fn export_failed(e: cli::error::ExportError) -> StatusCode {
    error!("CSV export failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

pub async fn get_votes_csv(State(state): State<AppState>) -> Result<Response, StatusCode> {
    info!("GET /votes.csv - Votes CSV requested");
    let snapshot = snapshot(&state).await?;
    let body = votes_csv(&snapshot.data.votes).map_err(export_failed)?;
    Ok(csv_response(
        &format!("xgov-session-{}-votes.csv", snapshot.data.session.session),
        body,
    ))
}

pub async fn get_voters_csv(State(state): State<AppState>) -> Result<Response, StatusCode> {
    info!("GET /voters.csv - Voters CSV requested");
    let snapshot = snapshot(&state).await?;
    let body = voters_csv(&snapshot.data.voters).map_err(export_failed)?;
    Ok(csv_response(
        &format!("xgov-session-{}-voters.csv", snapshot.data.session.session),
        body,
    ))
}

pub async fn get_governors_csv(State(state): State<AppState>) -> Result<Response, StatusCode> {
    info!("GET /governors.csv - Governors CSV requested");
    let snapshot = snapshot(&state).await?;
    let governors = snapshot.data.governors.as_ref().ok_or_else(|| {
        info!("Session has no governor data");
        StatusCode::NOT_FOUND
    })?;
    let body = governors_csv(&governors.snapshot).map_err(export_failed)?;
    Ok(csv_response(
        &format!("xgov-session-{}-governors.csv", snapshot.data.session.session),
        body,
    ))
}

pub async fn get_proposal_text(
    State(state): State<AppState>,
    Path(proposal_id): Path<String>,
) -> Result<Response, StatusCode> {
    info!("GET /proposal/{} - Proposal text requested", proposal_id);
    let snapshot = snapshot(&state).await?;

    let Some(proposal) = snapshot
        .data
        .results
        .iter()
        .find(|r| r.proposal_id == proposal_id)
    else {
        info!("Unknown proposal {}", proposal_id);
        return Err(StatusCode::NOT_FOUND);
    };

    match state.client.proposal_text(proposal).await {
        Ok(Some(text)) => Ok((
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            text,
        )
            .into_response()),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Fetching text of proposal {} failed: {}", proposal_id, e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}
