//! services/api/src/web/wordpress.rs
//!
//! Handlers that forward generated CSS to a WordPress site. Both routes sit
//! behind `require_wp_api_key`.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::middleware::WordPressApiKey;
use crate::web::protocol::{ApiJson, ApplyCssRequest, RevertCssRequest};
use crate::web::state::AppState;

/// Apply CSS on a WordPress site through the companion plugin.
#[utoipa::path(
    post,
    path = "/api/wordpress/apply-css",
    request_body = ApplyCssRequest,
    params(("X-WP-API-Key" = String, Header, description = "The plugin's API key.")),
    responses(
        (status = 200, description = "The plugin's response"),
        (status = 400, description = "Invalid site url or empty css"),
        (status = 401, description = "Missing or rejected API key"),
        (status = 500, description = "The site could not be reached")
    )
)]
pub async fn apply_css_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(WordPressApiKey(api_key)): Extension<WordPressApiKey>,
    ApiJson(request): ApiJson<ApplyCssRequest>,
) -> Result<Json<Value>, ApiError> {
    let result = app_state
        .wordpress
        .apply_css(
            &request.site_url,
            &api_key,
            &request.css,
            request.description.as_deref(),
        )
        .await?;
    Ok(Json(result))
}

/// Revert a previously applied CSS change.
#[utoipa::path(
    post,
    path = "/api/wordpress/revert-css/{changeId}",
    request_body = RevertCssRequest,
    params(
        ("changeId" = String, Path, description = "The change id returned when the CSS was applied."),
        ("X-WP-API-Key" = String, Header, description = "The plugin's API key.")
    ),
    responses(
        (status = 200, description = "The plugin's response"),
        (status = 401, description = "Missing or rejected API key"),
        (status = 500, description = "The site could not be reached")
    )
)]
pub async fn revert_css_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(WordPressApiKey(api_key)): Extension<WordPressApiKey>,
    Path(change_id): Path<String>,
    ApiJson(request): ApiJson<RevertCssRequest>,
) -> Result<Json<Value>, ApiError> {
    let result = app_state
        .wordpress
        .revert_css(&request.site_url, &api_key, &change_id)
        .await?;
    Ok(Json(result))
}
