//! services/api/src/web/middleware.rs
//!
//! Guards the WordPress routes.

use axum::{extract::Request, middleware::Next, response::Response};
use responsive_core::ports::PortError;

use crate::error::ApiError;

pub const WP_API_KEY_HEADER: &str = "x-wp-api-key";

/// The caller's WordPress plugin key, taken from the `X-WP-API-Key` header.
#[derive(Clone, Debug)]
pub struct WordPressApiKey(pub String);

/// Middleware that extracts the WordPress API key.
///
/// If present, inserts it into request extensions for handlers to use.
/// If missing or blank, returns 401 Unauthorized.
pub async fn require_wp_api_key(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let key = req
        .headers()
        .get(WP_API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::Port(PortError::Unauthorized(
                "X-WP-API-Key header is required".to_string(),
            ))
        })?;

    req.extensions_mut().insert(WordPressApiKey(key));
    Ok(next.run(req).await)
}
