//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        InMemoryDeviceCatalog, InMemoryProgressStore, OpenAiCompletionAdapter, ReqwestPageFetcher,
        ReqwestWordPressGateway, StaticHtmlRenderer,
    },
    config::Config,
    error::ApiError,
    web::{cancel_on_signal, router, state::AppState},
};
use responsive_core::ports::{CompletionService, PageFetcher};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let http_client = reqwest::Client::builder()
        .user_agent(config.fetch_user_agent.as_str())
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
    let fetcher: Arc<dyn PageFetcher> = Arc::new(ReqwestPageFetcher::with_client(http_client.clone()));
    let renderer = Arc::new(StaticHtmlRenderer::new(fetcher.clone()));
    let wordpress = Arc::new(ReqwestWordPressGateway::new(http_client));

    let (completion, fix_completion) = match config.openai_api_key.as_deref() {
        Some(api_key) => {
            let client =
                OpenAiCompletionAdapter::client_for(api_key, config.openai_base_url.as_deref());
            let analysis: Arc<dyn CompletionService> = Arc::new(OpenAiCompletionAdapter::new(
                client.clone(),
                config.analysis_model.clone(),
            ));
            let fixes: Arc<dyn CompletionService> = Arc::new(OpenAiCompletionAdapter::new(
                client,
                config.fix_model.clone(),
            ));
            info!(
                "AI endpoints enabled (analysis: {}, fixes: {})",
                config.analysis_model, config.fix_model
            );
            (Some(analysis), Some(fixes))
        }
        None => {
            warn!("OPENAI_API_KEY is not set. AI endpoints will answer 503.");
            (None, None)
        }
    };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        fetcher,
        renderer,
        completion,
        fix_completion,
        devices: Arc::new(InMemoryDeviceCatalog::seeded()),
        progress: Arc::new(InMemoryProgressStore::new()),
        wordpress,
    });

    // --- 4. Create the Web Router ---
    let app = router(app_state.clone())?;

    // --- 5. Start the Server ---
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), shutdown.clone()));

    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    app_state.teardown().await;
    info!("Server stopped");
    Ok(())
}
