//! Recording upload storage.
//!
//! Recordings are opaque media blobs; the coordinator never inspects them.
//! Each upload lands as `<dir>/<ROOMCODE>/<id>.webm` with a `<id>.json`
//! metadata sidecar next to it.

use std::path::PathBuf;

use uuid::Uuid;

use huddle_shared::time::{millis_to_rfc3339, now_utc_millis};

use crate::domain::{Identity, RoomCode, SignalingError};
use crate::infrastructure::dto::http::RecordingMetadataDto;

/// Writes uploaded recordings and their metadata sidecars to disk.
pub struct RecordingStore {
    base_dir: PathBuf,
}

impl RecordingStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Persist one uploaded recording. Returns the metadata that was also
    /// written to the sidecar.
    pub async fn save(
        &self,
        room_code: &RoomCode,
        uploader: &Identity,
        duration_secs: u64,
        data: &[u8],
    ) -> Result<RecordingMetadataDto, SignalingError> {
        let id = Uuid::new_v4().to_string();
        let room_dir = self.base_dir.join(room_code.as_str());
        tokio::fs::create_dir_all(&room_dir)
            .await
            .map_err(|e| SignalingError::Internal(format!("create recording dir: {e}")))?;

        let metadata = RecordingMetadataDto {
            id: id.clone(),
            room_code: room_code.as_str().to_string(),
            uploader: uploader.as_str().to_string(),
            duration_secs,
            size_bytes: data.len(),
            uploaded_at: millis_to_rfc3339(now_utc_millis()),
        };

        let media_path = room_dir.join(format!("{id}.webm"));
        tokio::fs::write(&media_path, data)
            .await
            .map_err(|e| SignalingError::Internal(format!("write recording: {e}")))?;

        let sidecar = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| SignalingError::Internal(format!("encode metadata: {e}")))?;
        let sidecar_path = room_dir.join(format!("{id}.json"));
        tokio::fs::write(&sidecar_path, sidecar)
            .await
            .map_err(|e| SignalingError::Internal(format!("write metadata: {e}")))?;

        tracing::info!(
            "Stored recording {} for room '{}' ({} bytes)",
            id,
            room_code,
            data.len()
        );

        Ok(metadata)
    }
}
