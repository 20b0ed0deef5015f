use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::envelope::{ChatCompletionRequest, ChatCompletionResponse, TEMPERATURE};
use super::{ChatMessage, ChatProvider, ChatReply, Provider};
use crate::error::GatewayError;

const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";

/// Marker DeepSeek puts in its 402 error body when the account balance
/// runs out.
const QUOTA_MARKER: &str = "Insufficient Balance";

/// Client for the DeepSeek chat-completions endpoint.
///
/// DeepSeek signals balance exhaustion through a recognizable error body,
/// so this client raises a dedicated quota error for it; its OpenAI
/// counterpart has no such detection.
#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DeepSeekClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEEPSEEK_API_BASE)
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
impl ChatProvider for DeepSeekClient {
    fn id(&self) -> Provider {
        Provider::DeepSeek
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<ChatReply, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::MissingCredential {
                provider: Provider::DeepSeek,
            });
        }

        debug!(model, message_count = messages.len(), "deepseek chat request");

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
                provider: Provider::DeepSeek,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains(QUOTA_MARKER) {
                warn!("deepseek account balance exhausted");
                return Err(GatewayError::QuotaExceeded {
                    provider: Provider::DeepSeek,
                });
            }
            warn!(status = status.as_u16(), "deepseek returned error status");
            return Err(GatewayError::Upstream {
                provider: Provider::DeepSeek,
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|source| GatewayError::Network {
                provider: Provider::DeepSeek,
                source,
            })?;

        let usage = body.token_usage();
        Ok(ChatReply {
            content: body.content_or_placeholder(),
            usage,
            provider: Provider::DeepSeek,
        })
    }
}
