//! services/api/src/adapters/wordpress.rs
//!
//! Forwards generated CSS to a WordPress site running the companion plugin.
//! Implements the `WordPressGateway` port.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use responsive_core::ports::{PortError, PortResult, WordPressGateway};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::page_fetcher::validate_page_url;

const PLUGIN_ROUTE: &str = "wp-json/responsive-tester/v1/css";
const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone)]
pub struct ReqwestWordPressGateway {
    client: Client,
}

impl ReqwestWordPressGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn endpoint(site_url: &str, suffix: &str) -> PortResult<String> {
        let site = validate_page_url(site_url).map_err(|_| {
            PortError::invalid_field("siteUrl", "siteUrl must be an absolute http or https address")
        })?;
        Ok(format!(
            "{}/{}{}",
            site.as_str().trim_end_matches('/'),
            PLUGIN_ROUTE,
            suffix
        ))
    }

    async fn post(&self, endpoint: &str, api_key: &str, body: Value) -> PortResult<Value> {
        let response = self
            .client
            .post(endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::UpstreamFailure(format!("WordPress request failed: {}", e)))?;
        read_plugin_response(endpoint, response).await
    }
}

async fn read_plugin_response(endpoint: &str, response: Response) -> PortResult<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| PortError::UpstreamFailure(format!("Failed to read WordPress response: {}", e)))?;

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        warn!("WordPress rejected the API key at {} ({})", endpoint, status);
        return Err(PortError::Unauthorized(
            "The WordPress site rejected the API key".to_string(),
        ));
    }
    if !status.is_success() {
        return Err(PortError::UpstreamFailure(format!(
            "WordPress responded with {}: {}",
            status,
            text.trim()
        )));
    }
    if text.trim().is_empty() {
        return Ok(json!({ "success": true }));
    }
    serde_json::from_str(&text)
        .map_err(|e| PortError::Parse(format!("WordPress returned invalid JSON: {}", e)))
}

#[async_trait]
impl WordPressGateway for ReqwestWordPressGateway {
    async fn apply_css(
        &self,
        site_url: &str,
        api_key: &str,
        css: &str,
        description: Option<&str>,
    ) -> PortResult<Value> {
        if css.trim().is_empty() {
            return Err(PortError::invalid_field("css", "css must not be empty"));
        }
        let endpoint = Self::endpoint(site_url, "")?;
        info!("Applying {} bytes of CSS to {}", css.len(), endpoint);
        let mut body = json!({ "css": css });
        if let Some(description) = description {
            body["description"] = Value::String(description.to_string());
        }
        self.post(&endpoint, api_key, body).await
    }

    async fn revert_css(&self, site_url: &str, api_key: &str, change_id: &str) -> PortResult<Value> {
        let change_id = change_id.trim();
        if change_id.is_empty() || !change_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(PortError::invalid_field("changeId", "changeId is not a valid identifier"));
        }
        let endpoint = Self::endpoint(site_url, &format!("/{}/revert", change_id))?;
        info!("Reverting CSS change {} via {}", change_id, endpoint);
        self.post(&endpoint, api_key, json!({})).await
    }
}
