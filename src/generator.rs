use crate::providers::{Embedder, Embedding, EmbeddingError};
use crate::retry::RetryPolicy;
use std::sync::Arc;

/// turns text into an embedding through the active provider and retry policy.
///
/// cheap to clone; the lifecycle manager and the search engine each hold one
/// pointing at the same provider instance.
pub struct EmbeddingGenerator<E> {
    embedder: Arc<E>,
    retry: RetryPolicy,
}

impl<E> Clone for EmbeddingGenerator<E> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            retry: self.retry,
        }
    }
}

impl<E: Embedder> EmbeddingGenerator<E> {
    pub fn new(embedder: Arc<E>, retry: RetryPolicy) -> Self {
        Self { embedder, retry }
    }

    pub fn provider_name(&self) -> &'static str {
        self.embedder.name()
    }

    /// blank text yields an empty vector without touching the provider
    pub async fn generate_embedding(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            logfire::warn!("skipping embedding for blank text");
            return Ok(Vec::new());
        }
        self.retry.run(self.embedder.as_ref(), text).await
    }
}
