use std::sync::Arc;

use pokegate::{
    config::AppConfig,
    graphql::{self, GatewayServices},
    http,
    orchestrator::ChatOrchestrator,
    pokemon::PokeApiClient,
    provider::{ChatProvider, DeepSeekClient, OpenAiClient},
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    if !config.has_openai_key() {
        warn!("OPENAI_API_KEY is not set; openai requests will fail with a credential error");
    }
    if !config.has_deepseek_key() {
        warn!("DEEPSEEK_API_KEY is not set; deepseek requests and fallback are disabled");
    }
    if let Some(environment) = &config.environment {
        info!(environment = %environment, "starting pokegate");
    }

    let openai: Arc<dyn ChatProvider> = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone().unwrap_or_default(),
    ));
    let deepseek: Arc<dyn ChatProvider> = Arc::new(DeepSeekClient::new(
        config.deepseek_api_key.clone().unwrap_or_default(),
    ));
    let orchestrator = Arc::new(ChatOrchestrator::new(
        openai.clone(),
        deepseek.clone(),
        &config,
    ));

    let schema = graphql::build_schema(GatewayServices {
        orchestrator,
        openai,
        deepseek,
        pokeapi: Arc::new(PokeApiClient::default()),
    });

    let app = http::router(schema);
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("pokegate GraphQL API listening on {}", config.http_bind);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}
