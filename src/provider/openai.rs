use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::envelope::{ChatCompletionRequest, ChatCompletionResponse, TEMPERATURE};
use super::{ChatMessage, ChatProvider, ChatReply, Provider};
use crate::error::GatewayError;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Client for the OpenAI chat-completions endpoint.
///
/// Unlike [`super::DeepSeekClient`] this client does not inspect error
/// bodies for a quota marker; every non-2xx surfaces as a generic
/// upstream error.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_API_BASE)
    }

    /// Point the client at a different host. Used by tests.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn id(&self) -> Provider {
        Provider::OpenAi
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<ChatReply, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::MissingCredential {
                provider: Provider::OpenAi,
            });
        }

        debug!(model, message_count = messages.len(), "openai chat request");

        let payload = ChatCompletionRequest {
            model,
            messages,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| GatewayError::Network {
                provider: Provider::OpenAi,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "openai returned error status");
            return Err(GatewayError::Upstream {
                provider: Provider::OpenAi,
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|source| GatewayError::Network {
                provider: Provider::OpenAi,
                source,
            })?;

        let usage = body.token_usage();
        Ok(ChatReply {
            content: body.content_or_placeholder(),
            usage,
            provider: Provider::OpenAi,
        })
    }
}
