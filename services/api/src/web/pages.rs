//! services/api/src/web/pages.rs
//!
//! Handlers that load or transform pages: the proxy, the scan and the live
//! preview of generated CSS.

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use responsive_core::stylesheet::{inject_preview_style, remove_preview_style};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::web::protocol::{ApiJson, FetchPageQuery, PreviewRequest, ScanRequest, ScanResponse};
use crate::web::scan_task::run_scan;
use crate::web::state::AppState;

/// Fetch a page server-side and return its raw HTML.
#[utoipa::path(
    get,
    path = "/api/fetch-page",
    params(FetchPageQuery),
    responses(
        (status = 200, description = "The page body", content_type = "text/html"),
        (status = 400, description = "Missing or invalid url"),
        (status = 500, description = "The page could not be fetched")
    )
)]
pub async fn fetch_page_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<FetchPageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::invalid_field("url", "url query parameter is required"))?;
    let page = app_state.fetcher.fetch(&url).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        page.body,
    ))
}

/// Run the responsive checklist against a page at one viewport size.
#[utoipa::path(
    post,
    path = "/api/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan findings", body = ScanResponse),
        (status = 400, description = "Invalid url or viewport"),
        (status = 500, description = "The page could not be loaded"),
        (status = 504, description = "The page did not load in time")
    )
)]
pub async fn scan_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    Ok(Json(run_scan(app_state, request).await?))
}

/// Inject (or remove) the generated stylesheet in a page for live preview.
#[utoipa::path(
    post,
    path = "/api/preview",
    request_body = PreviewRequest,
    responses((status = 200, description = "The page HTML", content_type = "text/html"))
)]
pub async fn preview_handler(ApiJson(request): ApiJson<PreviewRequest>) -> Html<String> {
    match request.css.as_deref().filter(|css| !css.trim().is_empty()) {
        Some(css) => {
            info!("Injecting {} bytes of preview CSS", css.len());
            Html(inject_preview_style(&request.html, css))
        }
        None => Html(remove_preview_style(&request.html)),
    }
}
