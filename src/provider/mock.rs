use async_trait::async_trait;

use super::{ChatMessage, ChatProvider, ChatReply, Provider, TokenUsage};
use crate::error::GatewayError;

/// Scripted provider for tests: answers with a fixed reply or synthesizes
/// a fixed failure on every call.
#[derive(Debug, Clone)]
pub struct MockChatProvider {
    id: Provider,
    behavior: MockBehavior,
}

#[derive(Debug, Clone)]
enum MockBehavior {
    Reply {
        content: String,
        usage: Option<TokenUsage>,
    },
    Upstream {
        status: u16,
    },
    MissingCredential,
}

impl MockChatProvider {
    pub fn replying(id: Provider, content: impl Into<String>) -> Self {
        Self {
            id,
            behavior: MockBehavior::Reply {
                content: content.into(),
                usage: None,
            },
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        if let MockBehavior::Reply { usage: slot, .. } = &mut self.behavior {
            *slot = Some(usage);
        }
        self
    }

    pub fn failing_upstream(id: Provider, status: u16) -> Self {
        Self {
            id,
            behavior: MockBehavior::Upstream { status },
        }
    }

    pub fn missing_credential(id: Provider) -> Self {
        Self {
            id,
            behavior: MockBehavior::MissingCredential,
        }
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    fn id(&self) -> Provider {
        self.id
    }

    async fn send_chat(
        &self,
        _messages: &[ChatMessage],
        _model: &str,
    ) -> Result<ChatReply, GatewayError> {
        match &self.behavior {
            MockBehavior::Reply { content, usage } => Ok(ChatReply {
                content: content.clone(),
                usage: *usage,
                provider: self.id,
            }),
            MockBehavior::Upstream { status } => Err(GatewayError::Upstream {
                provider: self.id,
                status: *status,
                body: "mock upstream failure".to_owned(),
            }),
            MockBehavior::MissingCredential => Err(GatewayError::MissingCredential {
                provider: self.id,
            }),
        }
    }
}
