//! services/api/src/web/audits.rs
//!
//! Colour contrast and resource audits of a fetched page.

use axum::{extract::State, Json};
use responsive_core::{contrast::audit_colors, resources::audit_resources};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::web::protocol::{ApiJson, ColorAuditResponse, PageUrlRequest, PerformanceResponse};
use crate::web::state::AppState;

/// Rate the text/background colour pairs a page declares against WCAG.
#[utoipa::path(
    post,
    path = "/api/analyze-colors",
    request_body = PageUrlRequest,
    responses(
        (status = 200, description = "Contrast checks", body = ColorAuditResponse),
        (status = 400, description = "Invalid url"),
        (status = 500, description = "The page could not be fetched")
    )
)]
pub async fn analyze_colors_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PageUrlRequest>,
) -> Result<Json<ColorAuditResponse>, ApiError> {
    let page = app_state.fetcher.fetch(&request.url).await?;
    let checks = audit_colors(&page.body);
    let failing = checks.iter().filter(|c| !c.aa_normal).count();
    info!("{} colour pairs checked on {}, {} below AA", checks.len(), page.url, failing);
    Ok(Json(ColorAuditResponse {
        success: true,
        url: page.url,
        checks,
        failing,
    }))
}

/// Count the resources a page loads and flag heavy pages.
#[utoipa::path(
    post,
    path = "/api/analyze-performance",
    request_body = PageUrlRequest,
    responses(
        (status = 200, description = "Resource audit", body = PerformanceResponse),
        (status = 400, description = "Invalid url"),
        (status = 500, description = "The page could not be fetched")
    )
)]
pub async fn analyze_performance_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PageUrlRequest>,
) -> Result<Json<PerformanceResponse>, ApiError> {
    let page = app_state.fetcher.fetch(&request.url).await?;
    let audit = audit_resources(&page.body, page.elapsed);
    Ok(Json(PerformanceResponse {
        success: true,
        url: page.url,
        audit,
    }))
}
