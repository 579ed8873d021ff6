//! services/api/src/web/progress.rs
//!
//! Handlers for points, levels and achievements.

use axum::{
    extract::{Path, State},
    Json,
};
use responsive_core::{
    progress::{ProgressAction, ProgressUpdate},
    UserProgress,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::protocol::ApiJson;
use crate::web::state::AppState;

/// Get a user's progress. Unknown users start at level 1 with no points.
#[utoipa::path(
    get,
    path = "/api/progress/{userId}",
    params(("userId" = String, Path, description = "Any client-chosen user id.")),
    responses(
        (status = 200, description = "The user's progress"),
        (status = 400, description = "Invalid user id")
    )
)]
pub async fn get_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProgress>, ApiError> {
    Ok(Json(app_state.progress.get(&user_id).await?))
}

/// Record an action and return the updated progress with any new achievements.
///
/// The body is `{"action": "scan_run"}`, `"ai_analysis"`, `"fixes_generated"`,
/// `"fixes_applied"`, or `{"action": "device_tested", "deviceId": "..."}`.
#[utoipa::path(
    post,
    path = "/api/progress/{userId}/actions",
    params(("userId" = String, Path, description = "Any client-chosen user id.")),
    responses(
        (status = 200, description = "Updated progress and unlocked achievements"),
        (status = 400, description = "Unknown action or invalid user id")
    )
)]
pub async fn record_action_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ApiJson(action): ApiJson<ProgressAction>,
) -> Result<Json<ProgressUpdate>, ApiError> {
    Ok(Json(app_state.progress.record(&user_id, action).await?))
}
