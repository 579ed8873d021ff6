//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the text-generation service used by the
//! analysis, CSS fix and design review endpoints.
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use responsive_core::ports::{CompletionService, PortError, PortResult};
use std::time::Duration;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds a client for the given key and optional base URL. Requests are
    /// attempted once; the client's rate-limit retry loop is switched off.
    pub fn client_for(api_key: &str, base_url: Option<&str>) -> Client<OpenAIConfig> {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = base_url {
            config = config.with_api_base(base.trim_end_matches('/'));
        }
        let single_attempt = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        Client::with_config(config).with_backoff(single_attempt)
    }

    fn messages(system: &str, user: &str) -> PortResult<Vec<ChatCompletionRequestMessage>> {
        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(map_openai_error)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(map_openai_error)?
                .into(),
        ])
    }

    async fn complete(&self, system: &str, user: &str, json: bool) -> PortResult<String> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(Self::messages(system, user)?)
            .n(1);
        if json {
            args.response_format(ResponseFormat::JsonObject);
        }
        let request = args.build().map_err(map_openai_error)?;

        debug!("Requesting completion from {} (json: {})", self.model, json);
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        // Extract the text content from the first choice in the response.
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            PortError::UpstreamFailure("Completion service returned no choices.".to_string())
        })?;
        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(PortError::Parse(
                "Completion service response contained no text content.".to_string(),
            )),
        }
    }
}

/// Maps client errors onto port errors. Undecodable API payloads are parse
/// failures; everything else means the call itself failed.
fn map_openai_error(e: OpenAIError) -> PortError {
    match e {
        OpenAIError::JSONDeserialize(err, _) => {
            PortError::Parse(format!("Unreadable completion response: {}", err))
        }
        other => PortError::UpstreamFailure(other.to_string()),
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    async fn complete_text(&self, system: &str, user: &str) -> PortResult<String> {
        self.complete(system, user, false).await
    }

    async fn complete_json(&self, system: &str, user: &str) -> PortResult<String> {
        self.complete(system, user, true).await
    }
}
