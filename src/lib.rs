pub mod config;
pub mod error;
pub mod graphql;
pub mod http;
pub mod orchestrator;
pub mod pokemon;
pub mod provider;
