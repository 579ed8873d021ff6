pub mod ai;
pub mod audits;
pub mod devices;
pub mod middleware;
pub mod pages;
pub mod progress;
pub mod protocol;
pub mod rest;
pub mod scan_task;
pub mod state;
pub mod wordpress;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::{future::Future, io, sync::Arc};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use middleware::{require_wp_api_key, WP_API_KEY_HEADER};
use rest::ApiDoc;
use state::AppState;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

fn cors_layer(origin: &str) -> Result<CorsLayer, ApiError> {
    let allow_origin = if origin.trim() == "*" {
        AllowOrigin::from(Any)
    } else {
        let value = origin.trim().parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid CORS origin '{}': {}", origin, e))
        })?;
        AllowOrigin::exact(value)
    };
    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(WP_API_KEY_HEADER),
        ]))
}

/// Builds the complete application: API routes, Swagger UI, CORS and request tracing.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let cors = cors_layer(&app_state.config.cors_origin)?;

    let wordpress_routes = Router::new()
        .route("/api/wordpress/apply-css", post(wordpress::apply_css_handler))
        .route(
            "/api/wordpress/revert-css/{changeId}",
            post(wordpress::revert_css_handler),
        )
        .layer(axum_middleware::from_fn(require_wp_api_key));

    let api_router = Router::new()
        .route(
            "/api/devices",
            get(devices::list_devices_handler).post(devices::create_device_handler),
        )
        .route("/api/devices/{id}", get(devices::get_device_handler))
        .route("/api/fetch-page", get(pages::fetch_page_handler))
        .route("/api/scan", post(pages::scan_handler))
        .route("/api/preview", post(pages::preview_handler))
        .route("/api/analyze", post(ai::analyze_handler))
        .route("/api/analyze-design", post(ai::analyze_design_handler))
        .route("/api/generate-css-fixes", post(ai::generate_css_fixes_handler))
        .route("/api/analyze-colors", post(audits::analyze_colors_handler))
        .route("/api/analyze-performance", post(audits::analyze_performance_handler))
        .route("/api/progress/{userId}", get(progress::get_progress_handler))
        .route(
            "/api/progress/{userId}/actions",
            post(progress::record_action_handler),
        )
        .merge(wordpress_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Cancels `shutdown` once `signal` fires. A signal that cannot be installed
/// leaves the server running until it is stopped some other way.
pub async fn cancel_on_signal<F>(signal: F, shutdown: CancellationToken)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Shutdown signal received");
            shutdown.cancel();
        }
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn signal_cancels_the_token() {
        let shutdown = CancellationToken::new();
        cancel_on_signal(async { Ok(()) }, shutdown.clone()).await;
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_serving() {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(cancel_on_signal(
            async { Err(io::Error::other("no signal handler")) },
            shutdown.clone(),
        ));

        let waited = tokio::time::timeout(Duration::from_millis(50), shutdown.cancelled()).await;
        assert!(waited.is_err());
        assert!(!shutdown.is_cancelled());
        task.abort();
    }
}
