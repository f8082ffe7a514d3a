//! entity store port and the in-memory implementation
//!
//! the search path only reads through `candidates`, which defaults to a full
//! scan. a store with a real vector index can override it without the scorer
//! or the search engine noticing.

use crate::model::{Service, ServicePatch};
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

pub trait ServiceStore: Send + Sync {
    fn find_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Service>, StoreError>> + Send;

    fn find_all(&self) -> impl Future<Output = Result<Vec<Service>, StoreError>> + Send;

    /// persist a new record, assigning its id
    fn insert(&self, service: Service) -> impl Future<Output = Result<Service, StoreError>> + Send;

    /// apply a point update; `None` when the id is unknown. the patch is
    /// applied atomically, so an embedding computed from an older description
    /// is never attached to a newer one (see `Service::apply`).
    fn update_fields(
        &self,
        id: &str,
        patch: ServicePatch,
    ) -> impl Future<Output = Result<Option<Service>, StoreError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn increment_usage(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// records the search engine may rank for one query
    fn candidates(&self) -> impl Future<Output = Result<Vec<Service>, StoreError>> + Send {
        self.find_all()
    }
}

/// process-local store keyed by id; iteration order is by id
#[derive(Default)]
pub struct InMemoryServiceStore {
    services: RwLock<BTreeMap<String, Service>>,
}

impl InMemoryServiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServiceStore for InMemoryServiceStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, StoreError> {
        Ok(self.services.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Service>, StoreError> {
        let services: Vec<Service> = self.services.read().await.values().cloned().collect();
        logfire::info!("retrieved services", count = services.len() as i64);
        Ok(services)
    }

    async fn insert(&self, mut service: Service) -> Result<Service, StoreError> {
        service.id = uuid::Uuid::new_v4().to_string();
        self.services
            .write()
            .await
            .insert(service.id.clone(), service.clone());
        Ok(service)
    }

    async fn update_fields(&self, id: &str, patch: ServicePatch) -> Result<Option<Service>, StoreError> {
        let mut services = self.services.write().await;
        Ok(services.get_mut(id).map(|service| {
            service.apply(patch);
            service.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.services.write().await.remove(id).is_some())
    }

    async fn increment_usage(&self, id: &str) -> Result<bool, StoreError> {
        let mut services = self.services.write().await;
        Ok(services
            .get_mut(id)
            .map(|service| service.usage_count += 1)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmbeddingChange, ServiceUpdate};
    use crate::testing::new_service;
    use pretty_assertions::assert_eq;

    const DESCRIPTION: &str =
        "Converts text between dozens of languages while preserving formatting and tone.";

    async fn seeded() -> (InMemoryServiceStore, Service) {
        let store = InMemoryServiceStore::new();
        let saved = store
            .insert(Service::from_new(new_service("Translator", DESCRIPTION), vec![1.0, 0.0]))
            .await
            .unwrap();
        (store, saved)
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let (store, saved) = seeded().await;
        assert!(!saved.id.is_empty());
        assert_eq!(store.find_by_id(&saved.id).await.unwrap(), Some(saved));
        assert_eq!(store.find_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_candidates_defaults_to_full_scan() {
        let (store, _) = seeded().await;
        store
            .insert(Service::from_new(new_service("Other", DESCRIPTION), vec![]))
            .await
            .unwrap();

        assert_eq!(store.candidates().await.unwrap().len(), 2);
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_fields() {
        let (store, saved) = seeded().await;
        let patch = ServicePatch {
            update: ServiceUpdate {
                name: Some("Translator Pro".to_string()),
                ..Default::default()
            },
            embedding: Some(EmbeddingChange::Fresh {
                source: DESCRIPTION.to_string(),
                embedding: vec![0.0, 1.0],
            }),
        };

        let updated = store.update_fields(&saved.id, patch.clone()).await.unwrap().unwrap();
        assert_eq!(updated.name, "Translator Pro");
        assert_eq!(updated.embedding, vec![0.0, 1.0]);
        assert!(!updated.embedding_stale);
        assert_eq!(updated.created_at, saved.created_at);

        assert_eq!(store.update_fields("missing", patch).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_usage_and_delete() {
        let (store, saved) = seeded().await;

        assert!(store.increment_usage(&saved.id).await.unwrap());
        assert!(store.increment_usage(&saved.id).await.unwrap());
        let reloaded = store.find_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(reloaded.usage_count, 2);
        assert_eq!(reloaded.updated_at, saved.updated_at);
        assert_eq!(reloaded.embedding, saved.embedding);

        assert!(!store.increment_usage("missing").await.unwrap());
        assert!(store.delete(&saved.id).await.unwrap());
        assert!(!store.delete(&saved.id).await.unwrap());
    }
}
