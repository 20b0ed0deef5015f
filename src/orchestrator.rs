use std::sync::Arc;

use tracing::warn;

use crate::{
    config::AppConfig,
    error::GatewayError,
    provider::{
        ChatMessage, ChatProvider, ChatReply, DEEPSEEK_DEFAULT_MODEL, OPENAI_DEFAULT_MODEL,
        Provider,
    },
};

/// Routes a conversation to the preferred provider and retries once on the
/// alternate one when the primary fails and the alternate has a credential.
pub struct ChatOrchestrator {
    openai: Arc<dyn ChatProvider>,
    deepseek: Arc<dyn ChatProvider>,
    openai_key_present: bool,
    deepseek_key_present: bool,
    default_model: Option<String>,
}

impl ChatOrchestrator {
    pub fn new(
        openai: Arc<dyn ChatProvider>,
        deepseek: Arc<dyn ChatProvider>,
        config: &AppConfig,
    ) -> Self {
        Self {
            openai,
            deepseek,
            openai_key_present: config.has_openai_key(),
            deepseek_key_present: config.has_deepseek_key(),
            default_model: config.default_model.clone(),
        }
    }

    /// The model string a request for `provider` resolves to.
    ///
    /// Long-standing quirk, kept deliberately: with no override and no
    /// configured default, the OpenAI path resolves to the DeepSeek model
    /// name. See DESIGN.md before changing this.
    pub fn requested_model(&self, provider: Provider, model_override: Option<&str>) -> String {
        match provider {
            Provider::OpenAi => model_override
                .or(self.default_model.as_deref())
                .unwrap_or(DEEPSEEK_DEFAULT_MODEL)
                .to_owned(),
            Provider::DeepSeek => model_override.unwrap_or(DEEPSEEK_DEFAULT_MODEL).to_owned(),
        }
    }

    fn client_for(&self, provider: Provider) -> &dyn ChatProvider {
        match provider {
            Provider::OpenAi => self.openai.as_ref(),
            Provider::DeepSeek => self.deepseek.as_ref(),
        }
    }

    /// One chat round trip with at most one cross-provider retry.
    ///
    /// The fallback call always uses the alternate provider's own default
    /// model; the caller's override applies to the preferred provider only.
    /// A fallback failure propagates directly, there is no second retry.
    pub async fn ask(
        &self,
        messages: &[ChatMessage],
        preferred: Provider,
        model_override: Option<&str>,
    ) -> Result<ChatReply, GatewayError> {
        let model = self.requested_model(preferred, model_override);

        let primary_error = match self.client_for(preferred).send_chat(messages, &model).await {
            Ok(reply) => return Ok(reply),
            Err(error) => error,
        };

        let fallback = match preferred {
            Provider::OpenAi if self.deepseek_key_present => {
                Some((Provider::DeepSeek, DEEPSEEK_DEFAULT_MODEL))
            }
            Provider::DeepSeek if self.openai_key_present => {
                Some((Provider::OpenAi, OPENAI_DEFAULT_MODEL))
            }
            _ => None,
        };

        match fallback {
            Some((alternate, fallback_model)) => {
                warn!(
                    preferred = %preferred,
                    alternate = %alternate,
                    error = %primary_error,
                    "primary provider failed, retrying on alternate"
                );
                self.client_for(alternate)
                    .send_chat(messages, fallback_model)
                    .await
            }
            None => Err(primary_error),
        }
    }
}
