//! services/api/src/web/scan_task.rs
//!
//! Orchestrates a scan: load the page under a time bound (or take the client's
//! snapshot), run the checklist, and optionally hand the findings to the
//! completion service. Also hosts the analysis and fix generation steps shared
//! with the AI endpoints.

use std::sync::Arc;

use responsive_core::{
    domain::has_problems,
    ports::PortError,
    prompt::{
        build_analysis_prompt, build_css_fix_prompt, parse_fix_set, ANALYSIS_SYSTEM_PROMPT,
        CSS_FIX_SYSTEM_PROMPT, NO_ISSUES_ANALYSIS,
    },
    scan, DeviceInfo, DeviceType, Finding, FixSet, PageSnapshot, ScreenSize,
};
use tracing::{info, warn};

use crate::adapters::page_fetcher::validate_page_url;
use crate::error::ApiError;
use crate::web::protocol::{ScanRequest, ScanResponse};
use crate::web::state::AppState;

/// Picks a device class for a bare viewport width.
pub fn device_type_for_width(width: u32) -> DeviceType {
    match width {
        0..=767 => DeviceType::Phone,
        768..=1023 => DeviceType::Tablet,
        _ => DeviceType::Laptop,
    }
}

pub fn validate_viewport(viewport: ScreenSize) -> Result<ScreenSize, ApiError> {
    if viewport.width == 0 || viewport.height == 0 {
        return Err(ApiError::invalid_field(
            "viewport",
            "viewport width and height must be greater than zero",
        ));
    }
    Ok(viewport)
}

/// Loads the page through the renderer, bounded by the configured scan timeout.
async fn load_snapshot(
    app_state: &AppState,
    url: &str,
    viewport: ScreenSize,
) -> Result<PageSnapshot, ApiError> {
    let limit = app_state.config.scan_timeout;
    match tokio::time::timeout(limit, app_state.renderer.render(url, viewport)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(PortError::Timeout(format!(
            "{} did not load within {} seconds",
            url,
            limit.as_secs()
        ))
        .into()),
    }
}

/// Runs one scan request end to end.
pub async fn run_scan(app_state: Arc<AppState>, request: ScanRequest) -> Result<ScanResponse, ApiError> {
    validate_page_url(&request.url)?;
    let url = request.url.trim().to_string();
    let viewport = validate_viewport(request.viewport)?;

    let snapshot = match request.snapshot {
        Some(snapshot) => snapshot,
        None => load_snapshot(&app_state, &url, viewport).await?,
    };
    let findings = scan(&snapshot, viewport);
    info!(
        "Scanned {} at {}: {} findings",
        url,
        viewport,
        findings.iter().filter(|f| f.is_problem()).count()
    );

    let (analysis, analysis_error) = if request.with_analysis {
        let device = DeviceInfo {
            width: viewport.width,
            height: viewport.height,
            device_type: request
                .device_type
                .unwrap_or_else(|| device_type_for_width(viewport.width)),
        };
        // The scan result stands on its own; a failed analysis is reported beside it.
        match analyze_findings(&app_state, &url, &device, &findings).await {
            Ok(text) => (Some(text), None),
            Err(e) => {
                warn!("Analysis for {} failed: {}", url, e);
                (None, Some(e.body().message))
            }
        }
    } else {
        (None, None)
    };

    Ok(ScanResponse {
        success: true,
        findings,
        analysis,
        analysis_error,
    })
}

/// Asks the completion service to explain the findings. Success-only findings
/// are answered with a fixed text and never reach the service.
pub async fn analyze_findings(
    app_state: &AppState,
    url: &str,
    device: &DeviceInfo,
    findings: &[Finding],
) -> Result<String, ApiError> {
    if !has_problems(findings) {
        return Ok(NO_ISSUES_ANALYSIS.to_string());
    }
    let completion = app_state.completion()?;
    let prompt = build_analysis_prompt(url, device, findings);
    Ok(completion.complete_text(ANALYSIS_SYSTEM_PROMPT, &prompt).await?)
}

/// Asks the completion service for CSS fixes. Success-only findings yield an
/// empty fix set without a call.
pub async fn generate_fixes(
    app_state: &AppState,
    url: &str,
    device: &DeviceInfo,
    findings: &[Finding],
) -> Result<FixSet, ApiError> {
    if !has_problems(findings) {
        return Ok(FixSet::default());
    }
    let completion = app_state.fix_completion()?;
    let prompt = build_css_fix_prompt(url, device, findings);
    let raw = completion.complete_json(CSS_FIX_SYSTEM_PROMPT, &prompt).await?;
    Ok(parse_fix_set(&raw)?)
}
