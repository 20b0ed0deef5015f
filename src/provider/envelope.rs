//! Wire types shared by the OpenAI-shaped and DeepSeek-shaped clients.
//!
//! Both upstreams speak the same chat-completions envelope; parsing is
//! deliberately lenient so a 2xx with a sparse body still yields a reply.

use serde::{Deserialize, Serialize};

use super::{ChatMessage, TokenUsage};

pub(crate) const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageBody>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatChoice {
    #[serde(default)]
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsageBody {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    pub fn token_usage(&self) -> Option<TokenUsage> {
        self.usage.as_ref().map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        })
    }

    /// First choice's message content. A missing choice or content is not a
    /// failure; the upstream answered, it just answered with nothing.
    pub fn content_or_placeholder(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| "No response".to_owned())
    }
}
