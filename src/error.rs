use thiserror::Error;

use crate::provider::Provider;

/// Everything that can go wrong between the gateway and its upstreams.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{provider} API key is not configured")]
    MissingCredential { provider: Provider },

    #[error("{provider} request failed with status {status}: {body}")]
    Upstream {
        provider: Provider,
        status: u16,
        body: String,
    },

    /// Balance exhaustion, detected only for providers whose error bodies
    /// carry a recognizable marker.
    #[error("{provider} account has insufficient balance, please top up and try again")]
    QuotaExceeded { provider: Provider },

    #[error("request to {provider} failed: {source}")]
    Network {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("pokemon data error: {message}")]
    PokemonData { message: String },
}

impl GatewayError {
    pub fn pokemon_data(message: impl Into<String>) -> Self {
        Self::PokemonData {
            message: message.into(),
        }
    }
}
