use crate::generator::EmbeddingGenerator;
use crate::lifecycle::EmbeddingLifecycle;
use crate::registry::EmbeddingBackend;
use crate::retry::RetryPolicy;
use crate::search::{self, SearchEngine};
use crate::services;
use crate::store::InMemoryServiceStore;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// everything the handlers share. the provider and the store are built once
/// and injected here; nothing is reached through globals.
pub struct AppState {
    pub lifecycle: EmbeddingLifecycle<EmbeddingBackend, InMemoryServiceStore>,
    pub search: SearchEngine<EmbeddingBackend, InMemoryServiceStore>,
    pub store: Arc<InMemoryServiceStore>,
}

impl AppState {
    pub fn new(embedder: EmbeddingBackend, store: Arc<InMemoryServiceStore>) -> Self {
        let generator = EmbeddingGenerator::new(Arc::new(embedder), RetryPolicy::default());
        Self {
            lifecycle: EmbeddingLifecycle::new(generator.clone(), store.clone()),
            search: SearchEngine::new(generator, store.clone()),
            store,
        }
    }
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "welcome to agent market: semantic discovery for callable apis"
    }))
}

/// route table shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index)).service(
        web::scope("/api")
            .route("/health", web::get().to(|| async { HttpResponse::Ok().body("ok") }))
            .service(
                web::scope("/services")
                    .route("", web::post().to(services::create))
                    // registered before "/{id}" so "search" is never taken for an id
                    .route("/search", web::get().to(search::search_get))
                    .route("/search", web::post().to(search::search))
                    .route("/{id}", web::get().to(services::get))
                    .route("/{id}", web::put().to(services::update))
                    .route("/{id}", web::delete().to(services::delete))
                    .route("/{id}/usage", web::post().to(services::report_usage)),
            ),
    );
}
