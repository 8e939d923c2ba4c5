use axum::{Json, extract::Extension};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::app_state::models::AppState;
use crate::error::AppError;

/// Returns the snapshot file contents
pub async fn get_signals(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    match app_state.snapshot_repository.read_raw().await {
        Ok(snapshots) => Ok(Json(snapshots)),
        Err(e) => {
            warn!("Cannot serve signals: {}", e);
            Err(e)
        }
    }
}
