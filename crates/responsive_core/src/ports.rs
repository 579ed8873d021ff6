//! crates/responsive_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the HTTP client, the completion service and the stores.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::domain::{Device, DeviceType, NewDevice, ScreenSize, UserProgress};
use crate::progress::ProgressAction;
use crate::progress::ProgressUpdate;
use crate::scanner::PageSnapshot;

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// The error type for all port operations.
///
/// Each variant is a failure class callers can branch on: a `Parse` failure means the
/// upstream answered with unusable output, `UpstreamFailure` means it could not be
/// reached or rejected the call, `UpstreamUnavailable` means it is not configured.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Upstream service unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Upstream request failed: {0}")]
    UpstreamFailure(String),
    #[error("Could not parse upstream response: {0}")]
    Parse(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Access to the document was refused: {0}")]
    AccessDenied(String),
}

/// The coarse failure class exposed to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    UpstreamUnavailable,
    UpstreamFailure,
    ParseFailure,
    Timeout,
    AccessDenied,
}

impl PortError {
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PortError::Validation { .. } => ErrorKind::Validation,
            PortError::NotFound(_) => ErrorKind::NotFound,
            PortError::Unauthorized(_) => ErrorKind::Unauthorized,
            PortError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            PortError::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
            PortError::Parse(_) => ErrorKind::ParseFailure,
            PortError::Timeout(_) => ErrorKind::Timeout,
            PortError::AccessDenied(_) => ErrorKind::AccessDenied,
        }
    }

    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortError::UpstreamFailure(_) | PortError::Timeout(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Port Payloads
//=========================================================================================

/// A page fetched through the proxy.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub elapsed: Duration,
}

impl FetchedPage {
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            }
            None => true,
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches an absolute http(s) URL and returns its body as text.
    async fn fetch(&self, url: &str) -> PortResult<FetchedPage>;
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Loads a page at the given viewport size and measures what the scanner needs.
    async fn render(&self, url: &str, viewport: ScreenSize) -> PortResult<PageSnapshot>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Requests free-form text.
    async fn complete_text(&self, system: &str, user: &str) -> PortResult<String>;

    /// Requests a JSON object. The raw text is returned unparsed so callers can
    /// report malformed output as a `Parse` error.
    async fn complete_json(&self, system: &str, user: &str) -> PortResult<String>;
}

#[async_trait]
pub trait DeviceCatalog: Send + Sync {
    async fn list(&self, device_type: Option<DeviceType>) -> PortResult<Vec<Device>>;

    async fn get(&self, id: &str) -> PortResult<Device>;

    async fn insert(&self, device: NewDevice) -> PortResult<Device>;

    async fn count(&self) -> usize;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Returns the user's progress, or a fresh record if the user is unknown.
    async fn get(&self, user_id: &str) -> PortResult<UserProgress>;

    async fn record(&self, user_id: &str, action: ProgressAction) -> PortResult<ProgressUpdate>;

    /// Drops all held progress. Called on shutdown.
    async fn clear(&self);
}

#[async_trait]
pub trait WordPressGateway: Send + Sync {
    async fn apply_css(
        &self,
        site_url: &str,
        api_key: &str,
        css: &str,
        description: Option<&str>,
    ) -> PortResult<serde_json::Value>;

    async fn revert_css(
        &self,
        site_url: &str,
        api_key: &str,
        change_id: &str,
    ) -> PortResult<serde_json::Value>;
}
