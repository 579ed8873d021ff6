//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::error::ApiError;
use responsive_core::ports::{
    CompletionService, DeviceCatalog, PageFetcher, PageRenderer, PortError, ProgressStore,
    WordPressGateway,
};
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub renderer: Arc<dyn PageRenderer>,
    /// `None` when no completion credential is configured.
    pub completion: Option<Arc<dyn CompletionService>>,
    /// Same credential as `completion`, bound to the CSS fix model.
    pub fix_completion: Option<Arc<dyn CompletionService>>,
    pub devices: Arc<dyn DeviceCatalog>,
    pub progress: Arc<dyn ProgressStore>,
    pub wordpress: Arc<dyn WordPressGateway>,
}

fn not_configured() -> ApiError {
    ApiError::Port(PortError::UpstreamUnavailable(
        "AI analysis is not configured: set OPENAI_API_KEY".to_string(),
    ))
}

impl AppState {
    /// Returns the completion service, or an `UpstreamUnavailable` error when
    /// the AI endpoints are not configured.
    pub fn completion(&self) -> Result<&Arc<dyn CompletionService>, ApiError> {
        self.completion.as_ref().ok_or_else(not_configured)
    }

    pub fn fix_completion(&self) -> Result<&Arc<dyn CompletionService>, ApiError> {
        self.fix_completion.as_ref().ok_or_else(not_configured)
    }

    /// Releases held state once the server has stopped accepting requests.
    pub async fn teardown(&self) {
        let devices = self.devices.count().await;
        self.progress.clear().await;
        info!("Application state torn down ({} devices in catalog)", devices);
    }
}
