mod app;
mod config;
mod embedding;
mod generator;
mod hashing;
mod lifecycle;
mod model;
mod providers;
mod registry;
mod retry;
mod scoring;
mod search;
mod services;
mod store;
#[cfg(test)]
mod testing;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use app::AppState;
use config::Config;
use opentelemetry_instrumentation_actix_web::{RequestMetrics, RequestTracing};
use registry::EmbeddingBackend;
use std::sync::Arc;
use store::InMemoryServiceStore;
use tracing::level_filters::LevelFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // initialize logfire with info level filter to exclude trace/debug spans
    let logfire = logfire::configure()
        .with_default_level_filter(LevelFilter::INFO)
        .finish()
        .map_err(|e| anyhow::anyhow!("failed to initialize logfire: {}", e))?;

    let _guard = logfire.shutdown_guard();

    // an unknown or unconfigured provider aborts here, before the server binds
    let config = Config::from_env()?;
    let embedder = EmbeddingBackend::from_config(&config).context("failed to initialize embedding provider")?;

    let host = config.host.clone();
    let port = config.port;

    logfire::info!("starting agent market server",
        host = &host,
        port = port as i64,
        embedding_provider = config.embedding_provider.as_str()
    );

    let state = web::Data::new(AppState::new(embedder, Arc::new(InMemoryServiceStore::new())));

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            // opentelemetry tracing and metrics FIRST
            .wrap(RequestTracing::new())
            .wrap(RequestMetrics::default())
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(app::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
