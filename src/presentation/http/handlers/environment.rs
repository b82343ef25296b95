//! Environment Handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::application::dto::{EnvironmentStatus, TimeStartsView};
use crate::presentation::http::extractors::ClientId;
use crate::shared::error::AppError;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct IntervalRequest {
    pub minutes: u32,
}

/// Register the calling client, creating the environment on first contact.
pub async fn connect(
    State(state): State<AppState>,
    ClientId(client_id): ClientId,
) -> Json<EnvironmentStatus> {
    if !state.timer.initialize(&client_id).await {
        state.timer.add_connection(&client_id).await;
    }
    Json(state.timer.status())
}

pub async fn status(State(state): State<AppState>) -> Json<EnvironmentStatus> {
    Json(state.timer.status())
}

pub async fn time_starts(State(state): State<AppState>) -> Json<TimeStartsView> {
    Json(state.timer.time_starts())
}

pub async fn reset(State(state): State<AppState>) -> Json<EnvironmentStatus> {
    state.timer.reset().await;
    Json(state.timer.status())
}

pub async fn set_interval(
    State(state): State<AppState>,
    Json(body): Json<IntervalRequest>,
) -> Result<Json<EnvironmentStatus>, AppError> {
    state.timer.set_interval(body.minutes)?;
    info!(minutes = body.minutes, "Interval changed over HTTP");
    Ok(Json(state.timer.status()))
}
