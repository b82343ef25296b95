//! Draw Handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::application::dto::DrawStatus;
use crate::shared::error::AppError;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDrawRequest {
    /// Run start used for the label; defaults to now
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct TickIntervalRequest {
    pub seconds: u64,
}

/// Start a run. The body is optional.
pub async fn start(
    State(state): State<AppState>,
    body: Option<Json<StartDrawRequest>>,
) -> Result<Json<DrawStatus>, AppError> {
    let start_time = body.and_then(|Json(body)| body.start_time);

    if !state.draws.start(start_time) {
        return Err(AppError::Conflict("A draw is already running".into()));
    }
    Ok(Json(state.draws.status()))
}

pub async fn stop(State(state): State<AppState>) -> Result<Json<DrawStatus>, AppError> {
    if !state.draws.stop().await {
        return Err(AppError::Conflict("No draw is running".into()));
    }
    Ok(Json(state.draws.status()))
}

pub async fn status(State(state): State<AppState>) -> Json<DrawStatus> {
    Json(state.draws.status())
}

pub async fn set_interval(
    State(state): State<AppState>,
    Json(body): Json<TickIntervalRequest>,
) -> Result<Json<DrawStatus>, AppError> {
    state.draws.set_tick_interval(body.seconds)?;
    Ok(Json(state.draws.status()))
}
