//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::web::protocol::{
    AnalyzeRequest, AnalyzeResponse, ApplyCssRequest, ColorAuditResponse, CssFixResponse,
    DesignRequest, IssueInput, PageUrlRequest, PerformanceResponse, PreviewRequest,
    RevertCssRequest, ScanRequest, ScanResponse,
};
use crate::web::{ai, audits, devices, pages, progress, wordpress};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        devices::list_devices_handler,
        devices::get_device_handler,
        devices::create_device_handler,
        pages::fetch_page_handler,
        pages::scan_handler,
        pages::preview_handler,
        ai::analyze_handler,
        ai::generate_css_fixes_handler,
        ai::analyze_design_handler,
        audits::analyze_colors_handler,
        audits::analyze_performance_handler,
        wordpress::apply_css_handler,
        wordpress::revert_css_handler,
        progress::get_progress_handler,
        progress::record_action_handler,
    ),
    components(
        schemas(
            ScanRequest, ScanResponse, IssueInput, AnalyzeRequest, AnalyzeResponse,
            CssFixResponse, DesignRequest, PreviewRequest, PageUrlRequest,
            ColorAuditResponse, PerformanceResponse, ApplyCssRequest, RevertCssRequest
        )
    ),
    tags(
        (name = "Responsive Tester API", description = "Scans pages for responsive design problems and generates CSS fixes.")
    )
)]
pub struct ApiDoc;
