//! services/api/src/web/ai.rs
//!
//! Handlers for the endpoints backed by the completion service.

use axum::{extract::State, Json};
use responsive_core::{
    prompt::{build_design_prompt, parse_design_issues, DESIGN_SYSTEM_PROMPT},
    stylesheet::synthesize,
    DesignIssue, Finding, ScreenSize,
};
use std::sync::Arc;
use tracing::info;

use crate::adapters::page_fetcher::validate_page_url;
use crate::error::ApiError;
use crate::web::protocol::{AnalyzeRequest, AnalyzeResponse, ApiJson, CssFixResponse, DesignRequest};
use crate::web::scan_task::{analyze_findings, generate_fixes, validate_viewport};
use crate::web::state::AppState;

fn findings_from(request: &AnalyzeRequest) -> Result<Vec<Finding>, ApiError> {
    validate_page_url(&request.url)?;
    validate_viewport(ScreenSize::new(request.device_info.width, request.device_info.height))
        .map_err(|_| {
            ApiError::invalid_field("deviceInfo", "device width and height must be greater than zero")
        })?;
    Ok(request.issues.iter().cloned().map(Finding::from).collect())
}

/// Explain a page's findings for one device.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Free-form analysis", body = AnalyzeResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "The completion service failed"),
        (status = 503, description = "AI analysis is not configured")
    )
)]
pub async fn analyze_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let findings = findings_from(&request)?;
    let analysis =
        analyze_findings(&app_state, request.url.trim(), &request.device_info, &findings).await?;
    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}

/// Generate CSS fixes for a page's findings, plus the stylesheet built from them.
#[utoipa::path(
    post,
    path = "/api/generate-css-fixes",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Generated fixes", body = CssFixResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "The completion service failed or answered with unusable output"),
        (status = 503, description = "AI analysis is not configured")
    )
)]
pub async fn generate_css_fixes_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> Result<Json<CssFixResponse>, ApiError> {
    let findings = findings_from(&request)?;
    let url = request.url.trim();
    let fixes = generate_fixes(&app_state, url, &request.device_info, &findings).await?;
    let stylesheet = synthesize(url, &fixes);
    info!(
        "Generated {} fixes and {} media queries for {}",
        fixes.fixes.len(),
        fixes.media_queries.len(),
        url
    );
    Ok(Json(CssFixResponse {
        success: true,
        fixes,
        stylesheet,
    }))
}

/// Review a page's HTML for design problems at a viewport size.
#[utoipa::path(
    post,
    path = "/api/analyze-design",
    request_body = DesignRequest,
    responses(
        (status = 200, description = "Design issues"),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "The completion service failed or answered with unusable output"),
        (status = 503, description = "AI analysis is not configured")
    )
)]
pub async fn analyze_design_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<DesignRequest>,
) -> Result<Json<Vec<DesignIssue>>, ApiError> {
    validate_page_url(&request.url)?;
    validate_viewport(ScreenSize::new(request.viewport_width, request.viewport_height))?;
    if request.html.trim().is_empty() {
        return Err(ApiError::invalid_field("html", "html must not be empty"));
    }

    let completion = app_state.completion()?;
    let prompt = build_design_prompt(
        request.url.trim(),
        &request.html,
        request.viewport_width,
        request.viewport_height,
    );
    let raw = completion.complete_json(DESIGN_SYSTEM_PROMPT, &prompt).await?;
    Ok(Json(parse_design_issues(&raw)?))
}
