//! provider abstraction for embedding backends
//!
//! the `Embedder` trait lets the lifecycle manager and the search orchestrator
//! stay ignorant of which backend turns text into vectors. exactly one backend
//! is active per process (see `registry`).
//!
//! ## failure taxonomy
//!
//! | kind | retried |
//! |------|---------|
//! | `Unconfigured` | never (raised at construction) |
//! | `RateLimited`, `Connection`, `Timeout` | yes, by `RetryPolicy` |
//! | `Api`, `MalformedResponse`, `Unimplemented` | never |

use std::future::Future;
use thiserror::Error;

/// a dense vector produced by the active provider
pub type Embedding = Vec<f32>;

/// errors that can occur when generating embeddings
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding provider not configured: {0}")]
    Unconfigured(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("failed to reach provider: {0}")]
    Connection(String),

    #[error("provider request timed out: {0}")]
    Timeout(String),

    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("{0} embedding backend is not implemented")]
    Unimplemented(&'static str),
}

impl EmbeddingError {
    /// transient failures are expected to clear up on their own and are
    /// the only ones worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EmbeddingError::RateLimited(_) | EmbeddingError::Connection(_) | EmbeddingError::Timeout(_)
        )
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbeddingError::Timeout(err.to_string())
        } else if err.is_builder() {
            EmbeddingError::Unconfigured(err.to_string())
        } else if err.is_decode() || err.is_body() {
            EmbeddingError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            EmbeddingError::Api {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            EmbeddingError::Connection(err.to_string())
        }
    }
}

/// a provider that can generate embeddings for text
///
/// implementations must tolerate concurrent calls and must not cache results.
/// callers are responsible for skipping blank text (see `EmbeddingGenerator`).
///
/// # example
///
/// ```ignore
/// let embedder = OpenAiEmbedder::new(api_key, base_url, model, timeout)?;
/// let embedding = embedder.embed("translate text between languages").await?;
/// ```
pub trait Embedder: Send + Sync {
    /// generate an embedding vector for the given text
    fn embed(&self, text: &str) -> impl Future<Output = Result<Embedding, EmbeddingError>> + Send;

    /// human-readable name for logging/debugging
    fn name(&self) -> &'static str;
}

/// reject vectors that are empty or carry NaN/infinite components
pub fn check_well_formed(embedding: &[f32]) -> Result<(), EmbeddingError> {
    if embedding.is_empty() {
        return Err(EmbeddingError::MalformedResponse(
            "provider returned an empty vector".to_string(),
        ));
    }
    if let Some(pos) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(EmbeddingError::MalformedResponse(format!(
            "non-finite value at index {pos}"
        )));
    }
    Ok(())
}
