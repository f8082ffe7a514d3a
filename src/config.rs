use crate::embedding::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::hashing::DEFAULT_HASH_DIMENSIONS;
use crate::registry::ProviderKind;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub embedding_provider: ProviderKind,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_embedding_model: String,
    pub deepseek_api_key: Option<String>,
    pub embedding_timeout: Duration,
    pub hash_embedding_dimensions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("failed to parse PORT")?,
            embedding_provider: env::var("EMBEDDING_PROVIDER")
                .unwrap_or_else(|_| "openai".to_string())
                .parse()
                .context("invalid EMBEDDING_PROVIDER")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_embedding_model: env::var("OPENAI_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            deepseek_api_key: env::var("DEEPSEEK_API_KEY").ok(),
            embedding_timeout: Duration::from_secs(
                env::var("EMBEDDING_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("failed to parse EMBEDDING_TIMEOUT_SECS")?,
            ),
            hash_embedding_dimensions: env::var("HASH_EMBEDDING_DIMENSIONS")
                .unwrap_or_else(|_| DEFAULT_HASH_DIMENSIONS.to_string())
                .parse()
                .context("failed to parse HASH_EMBEDDING_DIMENSIONS")?,
        })
    }
}
