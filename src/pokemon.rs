use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::GatewayError;

const POKEAPI_BASE: &str = "https://pokeapi.co/api/v2";

/// Read-only client for the public PokéAPI.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::with_base_url(POKEAPI_BASE)
    }
}

impl PokeApiClient {
    /// Point the client at a different host. Used by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch one Pokémon by numeric id or name. Names are lowercased
    /// before hitting the API, which only knows lowercase slugs.
    pub async fn fetch(&self, name_or_id: &str) -> Result<PokemonData, GatewayError> {
        let slug = name_or_id.trim().to_lowercase();
        debug!(slug = %slug, "pokeapi lookup");

        let response = self
            .client
            .get(format!("{}/pokemon/{slug}", self.base_url))
            .send()
            .await
            .map_err(|error| {
                warn!(?error, "pokeapi request failed");
                GatewayError::pokemon_data(format!("request for {slug} failed: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), slug = %slug, "pokeapi returned error status");
            return Err(GatewayError::pokemon_data(format!(
                "pokeapi returned status {status} for {slug}"
            )));
        }

        let data = response.json::<PokemonData>().await.map_err(|error| {
            warn!(?error, "failed to deserialize pokeapi response");
            GatewayError::pokemon_data(format!("malformed pokeapi payload for {slug}: {error}"))
        })?;

        info!(id = data.id, name = %data.name, "pokeapi lookup success");
        Ok(data)
    }

    /// Fetch two Pokémon concurrently. Either failure aborts the pair;
    /// there is no partial result.
    pub async fn fetch_pair(
        &self,
        first: &str,
        second: &str,
    ) -> Result<(PokemonData, PokemonData), GatewayError> {
        tokio::try_join!(self.fetch(first), self.fetch(second))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PokemonData {
    pub id: i64,
    pub name: String,
    pub height: i64,
    pub weight: i64,
    pub base_experience: Option<i64>,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub sprites: Sprites,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatSlot {
    pub base_stat: i64,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
}

impl PokemonData {
    pub fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|slot| slot.kind.name.clone()).collect()
    }

    pub fn ability_names(&self) -> Vec<String> {
        self.abilities
            .iter()
            .map(|slot| slot.ability.name.clone())
            .collect()
    }

    /// One-line fact sheet embedded into LLM prompts.
    pub fn fact_sheet(&self) -> String {
        let stats = self
            .stats
            .iter()
            .map(|slot| format!("{}={}", slot.stat.name, slot.base_stat))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{} (#{}): types {}; abilities {}; height {}, weight {}; stats {}",
            self.name,
            self.id,
            self.type_names().join("/"),
            self.ability_names().join(", "),
            self.height,
            self.weight,
            stats
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pikachu() -> PokemonData {
        serde_json::from_value(serde_json::json!({
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "base_experience": 112,
            "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}],
            "abilities": [
                {"ability": {"name": "static"}, "is_hidden": false},
                {"ability": {"name": "lightning-rod"}, "is_hidden": true}
            ],
            "stats": [
                {"base_stat": 35, "effort": 0, "stat": {"name": "hp"}},
                {"base_stat": 90, "effort": 2, "stat": {"name": "speed"}}
            ],
            "sprites": {"front_default": "https://example.test/pikachu.png"}
        }))
        .expect("fixture should deserialize")
    }

    #[test]
    fn parses_the_pokeapi_envelope() {
        let data = pikachu();
        assert_eq!(data.id, 25);
        assert_eq!(data.type_names(), ["electric"]);
        assert_eq!(data.ability_names(), ["static", "lightning-rod"]);
    }

    #[test]
    fn fact_sheet_lists_types_abilities_and_stats() {
        let sheet = pikachu().fact_sheet();
        assert!(sheet.starts_with("pikachu (#25)"));
        assert!(sheet.contains("types electric"));
        assert!(sheet.contains("hp=35"));
        assert!(sheet.contains("speed=90"));
    }
}
