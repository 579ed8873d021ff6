//! services/api/src/adapters/page_fetcher.rs
//!
//! The page proxy. Implements the `PageFetcher` port with `reqwest`, so target
//! pages are fetched server-side instead of from the browser.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use responsive_core::ports::{FetchedPage, PageFetcher, PortError, PortResult};
use std::time::Instant;
use tracing::{debug, info};

/// Parses and checks that `raw` is an absolute http(s) URL.
pub fn validate_page_url(raw: &str) -> PortResult<url::Url> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| PortError::invalid_field("url", format!("Invalid URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(PortError::invalid_field(
            "url",
            "URL must be an absolute http or https address",
        )),
    }
}

/// A `PageFetcher` backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestPageFetcher {
    client: Client,
}

impl ReqwestPageFetcher {
    /// Creates a new `ReqwestPageFetcher`. The client carries the configured user agent.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch(&self, url: &str) -> PortResult<FetchedPage> {
        let target = validate_page_url(url)?;
        let started = Instant::now();
        debug!("Fetching page {}", target);

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| PortError::UpstreamFailure(format!("Failed to fetch page: {}", e)))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(PortError::AccessDenied(format!(
                "{} responded with {}",
                final_url, status
            )));
        }
        if !status.is_success() {
            return Err(PortError::UpstreamFailure(format!(
                "Failed to fetch page: {} responded with {}",
                final_url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PortError::UpstreamFailure(format!("Failed to read page body: {}", e)))?;
        let elapsed = started.elapsed();
        info!("Fetched {} ({} bytes in {:?})", final_url, body.len(), elapsed);

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_absolute_http_urls() {
        assert!(validate_page_url("https://example.com/path?q=1").is_ok());
        assert!(validate_page_url(" http://localhost:8080 ").is_ok());
        for bad in ["example.com", "ftp://example.com", "javascript:alert(1)", ""] {
            let err = validate_page_url(bad).unwrap_err();
            assert!(matches!(err, PortError::Validation { .. }), "{}", bad);
        }
    }
}
