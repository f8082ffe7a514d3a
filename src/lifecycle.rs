//! keeps each service's embedding in step with its description
//!
//! - create: embed the description before the first insert.
//! - update: re-embed only when the update carries a description that differs
//!   from the stored one, or the stored embedding is empty or stale. no other
//!   field triggers a provider call.
//! - failure: logged and absorbed. the stored embedding keeps its previous
//!   value, which is empty for a brand-new service, and is flagged stale so the
//!   next update carrying a description retries. the rest of the create/update
//!   goes through.

use crate::generator::EmbeddingGenerator;
use crate::model::{EmbeddingChange, NewService, Service, ServicePatch, ServiceUpdate};
use crate::providers::Embedder;
use crate::store::{ServiceStore, StoreError};
use std::sync::Arc;
use tracing::Instrument;

pub struct EmbeddingLifecycle<E, S> {
    generator: EmbeddingGenerator<E>,
    store: Arc<S>,
}

impl<E: Embedder, S: ServiceStore> EmbeddingLifecycle<E, S> {
    pub fn new(generator: EmbeddingGenerator<E>, store: Arc<S>) -> Self {
        Self { generator, store }
    }

    pub async fn create_service(&self, new: NewService) -> Result<Service, StoreError> {
        let name = new.name.clone();
        let provider_id = new.provider_id.clone();
        let span = logfire::span!(
            "service.create",
            service_name = &name,
            provider_id = &provider_id,
            embedder = self.generator.provider_name()
        );

        async move {
            let embedding = match self.generator.generate_embedding(&new.description).await {
                Ok(embedding) => embedding,
                Err(err) => {
                    let error = err.to_string();
                    logfire::error!(
                        "failed to generate embedding for new service; storing without one",
                        service_name = &name,
                        error = &error,
                        transient = err.is_transient()
                    );
                    Vec::new()
                }
            };

            let created = self.store.insert(Service::from_new(new, embedding)).await?;

            logfire::info!(
                "service created",
                id = &created.id,
                service_name = &created.name,
                embedding_dim = created.embedding.len() as i64
            );

            Ok::<_, StoreError>(created)
        }
        .instrument(span)
        .await
    }

    /// `Ok(None)` when no service has this id
    pub async fn update_service(&self, id: &str, update: ServiceUpdate) -> Result<Option<Service>, StoreError> {
        let service_id = id.to_string();
        let Some(current) = self.store.find_by_id(id).await? else {
            logfire::warn!("service not found for update", id = &service_id);
            return Ok(None);
        };

        let mut embedding = None;
        let mut regenerated = false;
        if let Some(description) = update
            .description
            .as_deref()
            .filter(|d| current.needs_embedding(d))
        {
            regenerated = true;
            embedding = Some(match self.generator.generate_embedding(description).await {
                Ok(fresh) => {
                    logfire::info!(
                        "embedding regenerated",
                        id = &service_id,
                        embedding_dim = fresh.len() as i64
                    );
                    EmbeddingChange::Fresh {
                        source: description.to_string(),
                        embedding: fresh,
                    }
                }
                Err(err) => {
                    let error = err.to_string();
                    logfire::error!(
                        "failed to regenerate embedding; keeping previous one",
                        id = &service_id,
                        error = &error,
                        transient = err.is_transient()
                    );
                    EmbeddingChange::Failed
                }
            });
        }

        let updated = self.store.update_fields(id, ServicePatch { update, embedding }).await?;
        if let Some(service) = &updated {
            logfire::info!(
                "service updated",
                id = &service_id,
                regenerated = regenerated,
                embedding_stale = service.embedding_stale
            );
        }
        Ok(updated)
    }
}
