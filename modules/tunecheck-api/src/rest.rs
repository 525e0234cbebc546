use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ConnectInfo, Query, State,
    },
    response::Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use tunecheck_common::{AnalysisTarget, PlaylistInput, SafetyReport};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeParams {
    playlist_url: Option<String>,
    playlist_text: Option<String>,
}

/// `GET /api/analyze?playlistUrl=...`
pub async fn analyze_get(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    query: Result<Query<AnalyzeParams>, QueryRejection>,
) -> Result<Json<SafetyReport>, ApiError> {
    let Query(params) = query.map_err(query_rejected)?;
    run_analysis(&state, addr, params).await
}

/// `POST /api/analyze` with `{ "playlistText": ... }` or `{ "playlistUrl": ... }`.
/// A `playlistUrl` query parameter is honoured when the body has none.
pub async fn analyze_post(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    query: Result<Query<AnalyzeParams>, QueryRejection>,
    body: Result<Json<AnalyzeParams>, JsonRejection>,
) -> Result<Json<SafetyReport>, ApiError> {
    let Query(query) = query.map_err(query_rejected)?;
    let Json(body) = body.map_err(|e| {
        debug!(error = %e, "Rejected analyze body");
        ApiError::BadRequest("Request body must be JSON with playlistText or playlistUrl".into())
    })?;

    let params = AnalyzeParams {
        playlist_url: body.playlist_url.or(query.playlist_url),
        playlist_text: body.playlist_text.or(query.playlist_text),
    };
    run_analysis(&state, addr, params).await
}

fn query_rejected(e: QueryRejection) -> ApiError {
    debug!(error = %e, "Rejected analyze query");
    ApiError::BadRequest("Malformed query string".into())
}

async fn run_analysis(
    state: &AppState,
    addr: SocketAddr,
    params: AnalyzeParams,
) -> Result<Json<SafetyReport>, ApiError> {
    if !state.rate_limiter.allow(addr.ip()).await {
        return Err(ApiError::RateLimited);
    }

    let input = PlaylistInput::from_fields(
        params.playlist_url.as_deref(),
        params.playlist_text.as_deref(),
    )?;
    let target = input.resolve()?;

    if let Some(key) = target.cache_key() {
        if let Some(report) = state.cache.get(key).await {
            debug!(playlist = key, "Serving cached report");
            return Ok(Json(report));
        }
    }

    let report = state.analyzer.analyze_target(&target).await?;
    let kind = match target {
        AnalysisTarget::Playlist(_) => "playlist",
        AnalysisTarget::FreeText(_) => "free-text",
    };
    info!(
        kind,
        score = report.score,
        category = %report.category,
        "Analysis complete"
    );

    if let Some(key) = target.cache_key() {
        state.cache.insert(key.to_string(), report.clone()).await;
    }

    Ok(Json(report))
}
