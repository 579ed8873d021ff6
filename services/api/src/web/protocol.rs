//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API
//! server. Field names are camelCase on the wire.

use axum::extract::FromRequest;
use responsive_core::{
    contrast::ContrastCheck, resources::ResourceAudit, DeviceInfo, DeviceType, Finding, FixSet,
    IssueCategory, PageSnapshot, ScreenSize,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;

/// `Json` with rejections reported through `ApiError`, so a malformed body gets
/// the same error envelope as every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

//=========================================================================================
// Query Parameters
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeviceListQuery {
    /// Restrict the list to `phone`, `tablet` or `laptop`.
    #[serde(rename = "type")]
    pub device_type: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FetchPageQuery {
    /// The absolute http(s) URL to proxy.
    pub url: Option<String>,
}

//=========================================================================================
// Requests
//=========================================================================================

/// Runs the responsive checklist against a page at one viewport size.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub url: String,
    #[schema(value_type = Object)]
    pub viewport: ScreenSize,
    /// A snapshot measured by the browser. When present, the page is not loaded
    /// server-side.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub snapshot: Option<PageSnapshot>,
    /// Ask the completion service to explain the findings.
    #[serde(default)]
    pub with_analysis: bool,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub device_type: Option<DeviceType>,
}

/// A finding as posted back by the client.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueInput {
    #[serde(rename = "type", alias = "category")]
    #[schema(value_type = String)]
    pub category: IssueCategory,
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
    #[serde(default)]
    pub element: Option<String>,
}

impl From<IssueInput> for Finding {
    fn from(issue: IssueInput) -> Self {
        let title = issue
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| issue.description.clone());
        let finding = Finding::new(issue.category, title, issue.description);
        match issue.element {
            Some(element) => finding.with_element(element),
            None => finding,
        }
    }
}

/// Shared by `/api/analyze` and `/api/generate-css-fixes`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub url: String,
    #[schema(value_type = Object)]
    pub device_info: DeviceInfo,
    pub issues: Vec<IssueInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest {
    pub url: String,
    pub html: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewRequest {
    pub html: String,
    /// The stylesheet to inject. Omitted or blank removes any injected preview.
    #[serde(default)]
    pub css: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PageUrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCssRequest {
    pub site_url: String,
    pub css: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevertCssRequest {
    pub site_url: String,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    /// Set when the scan succeeded but the requested analysis did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CssFixResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub fixes: FixSet,
    pub stylesheet: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ColorAuditResponse {
    pub success: bool,
    pub url: String,
    #[schema(value_type = Vec<Object>)]
    pub checks: Vec<ContrastCheck>,
    /// How many checks fail WCAG AA for normal text.
    pub failing: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PerformanceResponse {
    pub success: bool,
    pub url: String,
    #[schema(value_type = Object)]
    pub audit: ResourceAudit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_input_accepts_type_or_category() {
        let issue: IssueInput = serde_json::from_str(
            r#"{"type":"warning","description":"Small text detected","element":"p"}"#,
        )
        .unwrap();
        let finding = Finding::from(issue);
        assert_eq!(finding.category, IssueCategory::Warning);
        assert_eq!(finding.title, "Small text detected");
        assert_eq!(finding.element.as_deref(), Some("p"));

        let issue: IssueInput = serde_json::from_str(
            r#"{"category":"error","title":"Horizontal overflow","description":"Page is 500px wide"}"#,
        )
        .unwrap();
        assert_eq!(Finding::from(issue).title, "Horizontal overflow");
    }

    #[test]
    fn scan_response_omits_absent_analysis() {
        let body = serde_json::to_value(ScanResponse {
            success: true,
            findings: vec![],
            analysis: None,
            analysis_error: Some("AI analysis is not configured".into()),
        })
        .unwrap();
        assert!(body.get("analysis").is_none());
        assert_eq!(body["analysisError"], "AI analysis is not configured");
    }
}
