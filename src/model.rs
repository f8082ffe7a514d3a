//! service listings as stored and as submitted by providers

use crate::providers::Embedding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NAME_LEN: (usize, usize) = (3, 100);
pub const DESCRIPTION_LEN: (usize, usize) = (50, 1000);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// how an agent calls the listed api
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub input_schema: Option<serde_json::Value>,
    #[serde(default)]
    pub output_schema: Option<serde_json::Value>,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ValidationError::new("api.endpoint", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ValidationError::new(
                "api.endpoint",
                "must be an absolute http(s) url",
            ));
        }
        Ok(())
    }
}

/// a stored listing. `embedding` is internal to search and never serialized.
/// `embedding_stale` marks a record whose embedding does not belong to its
/// current description; the next update carrying a description re-embeds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub id: String,
    pub provider_id: String,
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    pub tags: Option<Vec<String>>,
    pub api: ApiConfig,
    pub openapi_spec: Option<String>,
    #[serde(skip_serializing)]
    pub embedding: Embedding,
    #[serde(skip_serializing)]
    pub embedding_stale: bool,
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// build an unsaved record; the store assigns the id
    pub fn from_new(new: NewService, embedding: Embedding) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            provider_id: new.provider_id,
            name: new.name,
            description: new.description,
            categories: new.categories,
            tags: new.tags,
            api: new.api,
            openapi_spec: new.openapi_spec,
            embedding_stale: embedding.is_empty(),
            embedding,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// whether an update carrying `description` must call the provider
    pub fn needs_embedding(&self, description: &str) -> bool {
        self.embedding_stale || self.embedding.is_empty() || self.description != description
    }

    pub fn apply(&mut self, patch: ServicePatch) {
        let ServicePatch { update, embedding } = patch;
        let description_changed = update
            .description
            .as_deref()
            .is_some_and(|d| d != self.description);

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(categories) = update.categories {
            self.categories = categories;
        }
        if let Some(tags) = update.tags {
            self.tags = Some(tags);
        }
        if let Some(api) = update.api {
            self.api = api;
        }
        if let Some(openapi_spec) = update.openapi_spec {
            self.openapi_spec = Some(openapi_spec);
        }

        // a vector is only attached to the text it was computed from
        match embedding {
            Some(EmbeddingChange::Fresh { source, embedding }) if source == self.description => {
                self.embedding = embedding;
                self.embedding_stale = false;
            }
            Some(_) => self.embedding_stale = true,
            None if description_changed => self.embedding_stale = true,
            None => {}
        }
        self.updated_at = Utc::now();
    }
}

/// create request submitted by a provider
#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub provider_id: String,
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub api: ApiConfig,
    #[serde(default)]
    pub openapi_spec: Option<String>,
}

impl NewService {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider_id.trim().is_empty() {
            return Err(ValidationError::new("provider_id", "must not be empty"));
        }
        validate_len("name", &self.name, NAME_LEN)?;
        validate_len("description", &self.description, DESCRIPTION_LEN)?;
        validate_categories(&self.categories)?;
        self.api.validate()?;
        if let Some(spec) = &self.openapi_spec {
            validate_openapi(spec)?;
        }
        Ok(())
    }
}

/// partial update; absent fields are left alone. the owning provider cannot
/// be changed this way.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub api: Option<ApiConfig>,
    pub openapi_spec: Option<String>,
}

impl ServiceUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_len("name", name, NAME_LEN)?;
        }
        if let Some(description) = &self.description {
            validate_len("description", description, DESCRIPTION_LEN)?;
        }
        if let Some(categories) = &self.categories {
            validate_categories(categories)?;
        }
        if let Some(api) = &self.api {
            api.validate()?;
        }
        if let Some(spec) = &self.openapi_spec {
            validate_openapi(spec)?;
        }
        Ok(())
    }
}

/// outcome of re-embedding a description during an update
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingChange {
    /// `embedding` was computed from `source`
    Fresh { source: String, embedding: Embedding },
    Failed,
}

/// fields handed to the store for a point update
#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub update: ServiceUpdate,
    pub embedding: Option<EmbeddingChange>,
}

fn validate_len(field: &'static str, value: &str, (min, max): (usize, usize)) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::new(
            field,
            format!("length {len} is outside {min}..={max}"),
        ));
    }
    Ok(())
}

fn validate_categories(categories: &[String]) -> Result<(), ValidationError> {
    if categories.iter().all(|c| c.trim().is_empty()) {
        return Err(ValidationError::new("categories", "at least one category is required"));
    }
    Ok(())
}

fn validate_openapi(spec: &str) -> Result<(), ValidationError> {
    serde_json::from_str::<serde_json::Value>(spec)
        .map(|_| ())
        .map_err(|e| ValidationError::new("openapi_spec", format!("not valid json: {e}")))
}
