//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    domain::{Identity, RoomCode, SignalingError},
    infrastructure::dto::http::{JoinCheckDto, RecordingMetadataDto, RoomDetailDto, RoomSummaryDto, StatsDto},
    ui::state::AppState,
};

/// Translate the error taxonomy at the HTTP boundary.
fn status_for(err: &SignalingError) -> StatusCode {
    match err {
        SignalingError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        SignalingError::RecipientOffline(_) => StatusCode::NOT_FOUND,
        SignalingError::RoomFull(_) => StatusCode::FORBIDDEN,
        SignalingError::InvalidRoomCode(_) | SignalingError::InvalidIdentity(_) => {
            StatusCode::BAD_REQUEST
        }
        SignalingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of active rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    Json(state.get_rooms_usecase.execute().await)
}

/// Get room detail by code
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_code): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    state
        .get_room_detail_usecase
        .execute(&room_code)
        .await
        .map(Json)
        .map_err(|e| status_for(&e))
}

/// Pre-join validation: creates the room if absent, rejects when full
pub async fn join_check(
    State(state): State<Arc<AppState>>,
    Path(room_code): Path<String>,
) -> Result<Json<JoinCheckDto>, StatusCode> {
    state
        .ensure_room_usecase
        .execute(&room_code)
        .await
        .map(Json)
        .map_err(|e| status_for(&e))
}

/// Coordinator-wide statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsDto> {
    Json(state.get_stats_usecase.execute().await)
}

#[derive(Debug, Deserialize)]
pub struct RecordingQuery {
    pub uploader: String,
    #[serde(default)]
    pub duration_secs: u64,
}

/// Accept an uploaded recording blob and write it with a metadata sidecar
pub async fn upload_recording(
    State(state): State<Arc<AppState>>,
    Path(room_code): Path<String>,
    Query(query): Query<RecordingQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<RecordingMetadataDto>), StatusCode> {
    let room_code = RoomCode::new(&room_code).map_err(|e| status_for(&e))?;
    let uploader = Identity::new(&query.uploader).map_err(|e| status_for(&e))?;

    let metadata = state
        .recording_store
        .save(&room_code, &uploader, query.duration_secs, &body)
        .await
        .map_err(|e| {
            tracing::error!("Recording upload for room '{}' failed: {}", room_code, e);
            status_for(&e)
        })?;

    Ok((StatusCode::CREATED, Json(metadata)))
}
