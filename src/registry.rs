//! provider registry
//!
//! the configured provider name is resolved to a `ProviderKind` once, while the
//! config is loaded. an unknown name stops the process before it can serve.
//! `EmbeddingBackend` is the closed set of concrete embedders; dispatch is a
//! `match`, so adding a backend is a compile error until every site handles it.

use crate::config::Config;
use crate::embedding::{DeepSeekEmbedder, OpenAiEmbedder};
use crate::hashing::HashEmbedder;
use crate::providers::{Embedder, Embedding, EmbeddingError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported embedding provider '{0}' (expected one of: openai, deepseek, hash)")]
    UnknownProvider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    DeepSeek,
    Hash,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenAi, ProviderKind::DeepSeek, ProviderKind::Hash];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Hash => "hash",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or(ConfigError::UnknownProvider(name))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// the single embedder active in this process
pub enum EmbeddingBackend {
    OpenAi(OpenAiEmbedder),
    DeepSeek(DeepSeekEmbedder),
    Hash(HashEmbedder),
}

impl EmbeddingBackend {
    /// construct the backend named by the config; missing credentials surface
    /// here as `EmbeddingError::Unconfigured`, never on a later call
    pub fn from_config(config: &Config) -> Result<Self, EmbeddingError> {
        let backend = match config.embedding_provider {
            ProviderKind::OpenAi => EmbeddingBackend::OpenAi(OpenAiEmbedder::new(
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
                config.openai_embedding_model.clone(),
                config.embedding_timeout,
            )?),
            ProviderKind::DeepSeek => {
                EmbeddingBackend::DeepSeek(DeepSeekEmbedder::new(config.deepseek_api_key.clone())?)
            }
            ProviderKind::Hash => EmbeddingBackend::Hash(HashEmbedder::new(config.hash_embedding_dimensions)?),
        };

        logfire::info!("embedding provider initialized", provider = backend.name());

        Ok(backend)
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            EmbeddingBackend::OpenAi(_) => ProviderKind::OpenAi,
            EmbeddingBackend::DeepSeek(_) => ProviderKind::DeepSeek,
            EmbeddingBackend::Hash(_) => ProviderKind::Hash,
        }
    }
}

impl Embedder for EmbeddingBackend {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        match self {
            EmbeddingBackend::OpenAi(e) => e.embed(text).await,
            EmbeddingBackend::DeepSeek(e) => e.embed(text).await,
            EmbeddingBackend::Hash(e) => e.embed(text).await,
        }
    }

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}
