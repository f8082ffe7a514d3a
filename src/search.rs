//! semantic search over service listings
//!
//! ## pipeline
//!
//! 1. blank query → no results, no provider call
//! 2. embed the query (through the retry policy); failure → no results
//! 3. fetch candidates from the store once (full scan today, see
//!    `ServiceStore::candidates`); failure → no results
//! 4. drop candidates whose embedding is empty, non-finite, or of another
//!    dimension than the query
//! 5. cosine-score the rest, rank best-first with id tie-break, keep `top_k`
//!
//! every runtime failure degrades to an empty result list. nothing here writes
//! to the store.

use crate::app::AppState;
use crate::generator::EmbeddingGenerator;
use crate::model::Service;
use crate::providers::Embedder;
use crate::scoring::{cosine_similarity, rank, ScoredService, DEFAULT_TOP_K};
use crate::store::ServiceStore;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;

/// shortest query the http layer accepts
pub const MIN_QUERY_LEN: usize = 3;
/// largest `top_k` the http layer accepts
pub const MAX_TOP_K: usize = 100;

pub struct SearchEngine<E, S> {
    generator: EmbeddingGenerator<E>,
    store: Arc<S>,
}

/// why a candidate cannot be ranked against a query of `dimension`
fn exclusion_reason(embedding: &[f32], dimension: usize) -> Option<&'static str> {
    if embedding.is_empty() {
        Some("missing embedding")
    } else if embedding.iter().any(|v| !v.is_finite()) {
        Some("non-finite embedding values")
    } else if embedding.len() != dimension {
        Some("embedding dimension mismatch")
    } else {
        None
    }
}

impl<E: Embedder, S: ServiceStore> SearchEngine<E, S> {
    pub fn new(generator: EmbeddingGenerator<E>, store: Arc<S>) -> Self {
        Self { generator, store }
    }

    pub async fn search(&self, query: &str, top_k: usize) -> Vec<ScoredService> {
        let query_owned = query.to_string();
        let span = logfire::span!(
            "service_search",
            query = &query_owned,
            top_k = top_k as i64,
            embedder = self.generator.provider_name()
        );

        self.search_inner(query, top_k).instrument(span).await
    }

    async fn search_inner(&self, query: &str, top_k: usize) -> Vec<ScoredService> {
        let query_text = query.to_string();
        if query.trim().is_empty() {
            logfire::warn!("search query is empty");
            return Vec::new();
        }

        let query_embedding = match self.generator.generate_embedding(query).await {
            Ok(embedding) if !embedding.is_empty() => embedding,
            Ok(_) => return Vec::new(),
            Err(err) => {
                let error = err.to_string();
                logfire::error!("failed to embed search query", query = &query_text, error = &error);
                return Vec::new();
            }
        };

        logfire::info!(
            "query embedding generated",
            query = &query_text,
            embedding_dim = query_embedding.len() as i64
        );

        let candidates: Vec<Service> = match self.store.candidates().await {
            Ok(candidates) => candidates,
            Err(err) => {
                let error = err.to_string();
                logfire::error!("failed to load search candidates", error = &error);
                return Vec::new();
            }
        };
        let total_candidates = candidates.len();

        let scored: Vec<ScoredService> = candidates
            .into_iter()
            .filter(|service| match exclusion_reason(&service.embedding, query_embedding.len()) {
                Some(reason) => {
                    logfire::warn!(
                        "service skipped from search results",
                        id = &service.id,
                        reason = reason
                    );
                    false
                }
                None => true,
            })
            .map(|service| {
                let score = cosine_similarity(&query_embedding, &service.embedding);
                ScoredService { service, score }
            })
            .collect();

        let ranked_count = scored.len();
        let results = rank(scored, top_k);
        let top_score = results.first().map(|r| r.score as f64).unwrap_or(0.0);

        logfire::info!(
            "search completed",
            query = &query_text,
            total_candidates = total_candidates as i64,
            ranked = ranked_count as i64,
            results_count = results.len() as i64,
            top_score = top_score
        );

        results
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredService>,
}

/// shared search implementation used by both POST and GET handlers
async fn perform_search(query: &SearchQuery, state: &AppState) -> ActixResult<SearchResponse> {
    if query.query.trim().chars().count() < MIN_QUERY_LEN {
        return Err(actix_web::error::ErrorUnprocessableEntity(format!(
            "query must be at least {MIN_QUERY_LEN} characters"
        )));
    }
    let top_k = query.top_k.min(MAX_TOP_K);

    logfire::info!("search request received", query = &query.query, top_k = top_k as i64);

    let results = state.search.search(&query.query, top_k).await;
    Ok(SearchResponse { results })
}

/// POST /api/services/search
pub async fn search(query: web::Json<SearchQuery>, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let response = perform_search(&query, &state).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/services/search for shareable urls
pub async fn search_get(query: web::Query<SearchQuery>, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let response = perform_search(&query, &state).await?;
    Ok(HttpResponse::Ok().json(response))
}
