use std::{env, net::SocketAddr};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub openai_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub default_model: Option<String>,
    pub environment: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_owned());
        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| format!("0.0.0.0:{port}"));
        let http_bind = http_bind.parse()?;

        Ok(Self {
            http_bind,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            deepseek_api_key: env::var("DEEPSEEK_API_KEY").ok(),
            default_model: env::var("DEFAULT_MODEL").ok(),
            environment: env::var("ENVIRONMENT").ok(),
        })
    }

    pub fn has_openai_key(&self) -> bool {
        self.openai_api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    pub fn has_deepseek_key(&self) -> bool {
        self.deepseek_api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}
