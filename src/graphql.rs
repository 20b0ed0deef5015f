use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, Error, Object, Result, Schema, SimpleObject,
};

use crate::{
    orchestrator::ChatOrchestrator,
    pokemon::{PokeApiClient, PokemonData},
    provider::{ChatMessage, ChatProvider, ChatReply, Provider, TokenUsage},
};

pub type GatewaySchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Shared services every resolver draws from. Credentials and defaults are
/// baked in at startup; nothing here mutates after construction.
#[derive(Clone)]
pub struct GatewayServices {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub openai: Arc<dyn ChatProvider>,
    pub deepseek: Arc<dyn ChatProvider>,
    pub pokeapi: Arc<PokeApiClient>,
}

pub fn build_schema(services: GatewayServices) -> GatewaySchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(services)
        .finish()
}

const POKEDEX_PERSONA: &str = "You are an enthusiastic Pokédex assistant. \
Answer with accurate Pokémon facts, keep it concise, and stay in character.";

#[derive(Debug, Clone, Copy, Default, SimpleObject)]
pub struct Usage {
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
}

impl From<TokenUsage> for Usage {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens as i32,
            completion_tokens: usage.completion_tokens as i32,
            total_tokens: usage.total_tokens as i32,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AiAnswer {
    pub content: String,
    /// The upstream that actually answered, which after a fallback may
    /// differ from the one requested.
    pub provider: String,
    /// The model the request resolved to, not necessarily the model that
    /// answered when a fallback stepped in.
    pub model: String,
    pub usage: Usage,
}

impl AiAnswer {
    fn from_reply(reply: ChatReply, model: String) -> Self {
        Self {
            content: reply.content,
            provider: reply.provider.as_str().to_owned(),
            model,
            // Upstreams that omit usage count as zero tokens, not null.
            usage: reply.usage.map(Usage::from).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Pokemon {
    pub id: i32,
    pub name: String,
    pub height: i32,
    pub weight: i32,
    pub base_experience: Option<i32>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<PokemonStat>,
    pub sprite: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct PokemonStat {
    pub name: String,
    pub value: i32,
}

impl From<PokemonData> for Pokemon {
    fn from(data: PokemonData) -> Self {
        Self {
            id: data.id as i32,
            name: data.name.clone(),
            height: data.height as i32,
            weight: data.weight as i32,
            base_experience: data.base_experience.map(|xp| xp as i32),
            types: data.type_names(),
            abilities: data.ability_names(),
            stats: data
                .stats
                .iter()
                .map(|slot| PokemonStat {
                    name: slot.stat.name.clone(),
                    value: slot.base_stat as i32,
                })
                .collect(),
            sprite: data.sprites.front_default,
        }
    }
}

fn parse_provider(value: Option<&str>, operation: &str) -> Result<Provider> {
    match value {
        None => Ok(Provider::OpenAi),
        Some(raw) => raw
            .parse()
            .map_err(|message| Error::new(format!("{operation} error: {message}"))),
    }
}

fn field_error(operation: &str, error: impl std::fmt::Display) -> Error {
    Error::new(format!("{operation} error: {error}"))
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Structured PokéAPI facts for one Pokémon.
    async fn pokemon(&self, ctx: &Context<'_>, id: i32) -> Result<Pokemon> {
        let services = ctx.data_unchecked::<GatewayServices>();
        let data = services
            .pokeapi
            .fetch(&id.to_string())
            .await
            .map_err(|error| field_error("pokemon", error))?;
        Ok(data.into())
    }

    /// Direct OpenAI call, no fallback.
    #[graphql(name = "chatGPT")]
    async fn chat_gpt(
        &self,
        ctx: &Context<'_>,
        prompt: String,
        model: Option<String>,
    ) -> Result<AiAnswer> {
        let services = ctx.data_unchecked::<GatewayServices>();
        let model = model.unwrap_or_else(|| Provider::OpenAi.default_model().to_owned());
        let messages = [ChatMessage::user(prompt)];
        let reply = services
            .openai
            .send_chat(&messages, &model)
            .await
            .map_err(|error| field_error("ChatGPT", error))?;
        Ok(AiAnswer::from_reply(reply, model))
    }

    /// Direct DeepSeek call, no fallback.
    async fn deepseek(
        &self,
        ctx: &Context<'_>,
        prompt: String,
        model: Option<String>,
    ) -> Result<AiAnswer> {
        let services = ctx.data_unchecked::<GatewayServices>();
        let model = model.unwrap_or_else(|| Provider::DeepSeek.default_model().to_owned());
        let messages = [ChatMessage::user(prompt)];
        let reply = services
            .deepseek
            .send_chat(&messages, &model)
            .await
            .map_err(|error| field_error("DeepSeek", error))?;
        Ok(AiAnswer::from_reply(reply, model))
    }

    /// Coordinated call: preferred provider with one cross-provider retry.
    #[graphql(name = "askAI")]
    async fn ask_ai(
        &self,
        ctx: &Context<'_>,
        prompt: String,
        provider: Option<String>,
        model: Option<String>,
    ) -> Result<AiAnswer> {
        let services = ctx.data_unchecked::<GatewayServices>();
        let preferred = parse_provider(provider.as_deref(), "askAI")?;

        // Echoed back as-is even when the fallback answered with its own
        // default model; `provider` is the source of truth for who answered.
        let requested_model = services
            .orchestrator
            .requested_model(preferred, model.as_deref());

        let messages = [ChatMessage::user(prompt)];
        let reply = services
            .orchestrator
            .ask(&messages, preferred, model.as_deref())
            .await
            .map_err(|error| field_error("askAI", error))?;
        Ok(AiAnswer::from_reply(reply, requested_model))
    }

    /// Pokédex-persona description of one Pokémon, grounded in PokéAPI
    /// facts. Returns prose only; usage and provider metadata are dropped.
    #[graphql(name = "pokemonInfo")]
    async fn pokemon_info(
        &self,
        ctx: &Context<'_>,
        name: String,
        provider: Option<String>,
    ) -> Result<String> {
        let services = ctx.data_unchecked::<GatewayServices>();
        let preferred = parse_provider(provider.as_deref(), "pokemonInfo")?;

        let data = services
            .pokeapi
            .fetch(&name)
            .await
            .map_err(|error| field_error("pokemonInfo", error))?;

        let messages = [
            ChatMessage::system(POKEDEX_PERSONA),
            ChatMessage::user(format!(
                "Describe this Pokémon for a trainer:\n{}",
                data.fact_sheet()
            )),
        ];
        let reply = services
            .orchestrator
            .ask(&messages, preferred, None)
            .await
            .map_err(|error| field_error("pokemonInfo", error))?;
        Ok(reply.content)
    }

    /// Head-to-head comparison of two Pokémon. Both PokéAPI fetches run
    /// concurrently and either failure fails the whole field.
    #[graphql(name = "comparePokemon")]
    async fn compare_pokemon(
        &self,
        ctx: &Context<'_>,
        pokemon1: String,
        pokemon2: String,
        provider: Option<String>,
    ) -> Result<String> {
        let services = ctx.data_unchecked::<GatewayServices>();
        let preferred = parse_provider(provider.as_deref(), "comparePokemon")?;

        let (first, second) = services
            .pokeapi
            .fetch_pair(&pokemon1, &pokemon2)
            .await
            .map_err(|error| field_error("comparePokemon", error))?;

        let messages = [
            ChatMessage::system(POKEDEX_PERSONA),
            ChatMessage::user(format!(
                "Compare these two Pokémon and say which would likely win a battle:\n{}\n{}",
                first.fact_sheet(),
                second.fact_sheet()
            )),
        ];
        let reply = services
            .orchestrator
            .ask(&messages, preferred, None)
            .await
            .map_err(|error| field_error("comparePokemon", error))?;
        Ok(reply.content)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        orchestrator::ChatOrchestrator,
        pokemon::PokeApiClient,
        provider::{MockChatProvider, Provider, TokenUsage},
    };

    use super::{GatewaySchema, GatewayServices, build_schema};

    fn schema_with(
        openai: MockChatProvider,
        deepseek: MockChatProvider,
        config: AppConfig,
    ) -> GatewaySchema {
        let openai = Arc::new(openai);
        let deepseek = Arc::new(deepseek);
        let orchestrator = Arc::new(ChatOrchestrator::new(
            openai.clone(),
            deepseek.clone(),
            &config,
        ));
        build_schema(GatewayServices {
            orchestrator,
            openai,
            deepseek,
            pokeapi: Arc::new(PokeApiClient::default()),
        })
    }

    fn config(openai_key: Option<&str>, deepseek_key: Option<&str>) -> AppConfig {
        AppConfig {
            http_bind: "127.0.0.1:0".parse().unwrap(),
            openai_api_key: openai_key.map(str::to_owned),
            deepseek_api_key: deepseek_key.map(str::to_owned),
            default_model: None,
            environment: None,
        }
    }

    #[tokio::test]
    async fn ask_ai_reports_the_provider_that_answered() {
        let schema = schema_with(
            MockChatProvider::failing_upstream(Provider::OpenAi, 500),
            MockChatProvider::replying(Provider::DeepSeek, "covered"),
            config(Some("sk-a"), Some("sk-b")),
        );

        let response = schema
            .execute(r#"{ askAI(prompt: "hi") { content provider } }"#)
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        assert_eq!(data["askAI"]["content"], "covered");
        assert_eq!(data["askAI"]["provider"], "deepseek");
    }

    #[tokio::test]
    async fn ask_ai_echoes_the_requested_model_even_after_fallback() {
        let mut config = config(Some("sk-a"), Some("sk-b"));
        config.default_model = Some("gpt-4o".to_owned());
        let schema = schema_with(
            MockChatProvider::failing_upstream(Provider::OpenAi, 500),
            MockChatProvider::replying(Provider::DeepSeek, "covered"),
            config,
        );

        let response = schema
            .execute(r#"{ askAI(prompt: "hi") { provider model } }"#)
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        // DeepSeek answered with its own default, the echo keeps the
        // requested resolution.
        let data = response.data.into_json().unwrap();
        assert_eq!(data["askAI"]["provider"], "deepseek");
        assert_eq!(data["askAI"]["model"], "gpt-4o");
    }

    #[tokio::test]
    async fn ask_ai_substitutes_zero_usage_when_upstream_omits_it() {
        let schema = schema_with(
            MockChatProvider::replying(Provider::OpenAi, "ok"),
            MockChatProvider::replying(Provider::DeepSeek, "unused"),
            config(Some("sk-a"), Some("sk-b")),
        );

        let response = schema
            .execute(r#"{ askAI(prompt: "hi") { usage { totalTokens promptTokens } } }"#)
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        assert_eq!(data["askAI"]["usage"]["totalTokens"], 0);
        assert_eq!(data["askAI"]["usage"]["promptTokens"], 0);
    }

    #[tokio::test]
    async fn ask_ai_passes_usage_through_when_reported() {
        let schema = schema_with(
            MockChatProvider::replying(Provider::OpenAi, "ok").with_usage(TokenUsage {
                prompt_tokens: 3,
                completion_tokens: 5,
                total_tokens: 8,
            }),
            MockChatProvider::replying(Provider::DeepSeek, "unused"),
            config(Some("sk-a"), Some("sk-b")),
        );

        let response = schema
            .execute(r#"{ askAI(prompt: "hi") { usage { totalTokens } } }"#)
            .await;
        let data = response.data.into_json().unwrap();
        assert_eq!(data["askAI"]["usage"]["totalTokens"], 8);
    }

    #[tokio::test]
    async fn ask_ai_rejects_unknown_providers() {
        let schema = schema_with(
            MockChatProvider::replying(Provider::OpenAi, "ok"),
            MockChatProvider::replying(Provider::DeepSeek, "ok"),
            config(Some("sk-a"), Some("sk-b")),
        );

        let response = schema
            .execute(r#"{ askAI(prompt: "hi", provider: "claude") { content } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        assert!(
            response.errors[0]
                .message
                .contains("unknown provider: claude")
        );
    }

    #[tokio::test]
    async fn direct_queries_wrap_failures_with_the_provider_name() {
        let schema = schema_with(
            MockChatProvider::failing_upstream(Provider::OpenAi, 429),
            MockChatProvider::missing_credential(Provider::DeepSeek),
            config(Some("sk-a"), None),
        );

        let response = schema
            .execute(r#"{ chatGPT(prompt: "hi") { content } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.starts_with("ChatGPT error:"));

        let response = schema
            .execute(r#"{ deepseek(prompt: "hi") { content } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.starts_with("DeepSeek error:"));
        assert!(response.errors[0].message.contains("not configured"));
    }

    #[tokio::test]
    async fn direct_deepseek_query_never_falls_back() {
        // OpenAI would answer, but the direct query must not reach for it.
        let schema = schema_with(
            MockChatProvider::replying(Provider::OpenAi, "should not answer"),
            MockChatProvider::failing_upstream(Provider::DeepSeek, 401),
            config(Some("sk-a"), Some("sk-b")),
        );

        let response = schema
            .execute(r#"{ deepseek(prompt: "hi") { content } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.starts_with("DeepSeek error:"));
    }

    #[tokio::test]
    async fn ask_ai_surfaces_credential_errors_when_nothing_is_configured() {
        let schema = schema_with(
            MockChatProvider::missing_credential(Provider::OpenAi),
            MockChatProvider::missing_credential(Provider::DeepSeek),
            config(None, None),
        );

        let response = schema
            .execute(r#"{ askAI(prompt: "hi") { content } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        assert!(
            response.errors[0]
                .message
                .contains("openai API key is not configured")
        );
    }
}
