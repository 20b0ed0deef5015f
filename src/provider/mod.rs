mod deepseek;
mod envelope;
mod mock;
mod openai;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use deepseek::DeepSeekClient;
pub use mock::MockChatProvider;
pub use openai::OpenAiClient;

use crate::error::GatewayError;

pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";

/// Identity of an upstream chat-completion provider. Determines the
/// endpoint, the credential slot, and the default model string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    DeepSeek,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::DeepSeek => "deepseek",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => OPENAI_DEFAULT_MODEL,
            Provider::DeepSeek => DEEPSEEK_DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "deepseek" => Ok(Provider::DeepSeek),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Token accounting as reported by the upstream, when it reports any.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Normalized result of one chat-completion call. `provider` names the
/// upstream that actually answered, which after a fallback may differ from
/// the one the caller asked for.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub content: String,
    pub usage: Option<TokenUsage>,
    pub provider: Provider,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> Provider;

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<ChatReply, GatewayError>;
}
