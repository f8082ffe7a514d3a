//! shared test doubles

use crate::config::Config;
use crate::model::{ApiConfig, HttpMethod, NewService};
use crate::providers::{Embedder, Embedding, EmbeddingError};
use crate::registry::ProviderKind;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// embedder that replays a script of outcomes, then answers from a lookup table.
/// text missing from the table fails with `Unimplemented`.
pub struct ScriptedEmbedder {
    script: Mutex<VecDeque<Result<Embedding, EmbeddingError>>>,
    table: HashMap<String, Embedding>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl ScriptedEmbedder {
    pub fn new(script: Vec<Result<Embedding, EmbeddingError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            table: HashMap::new(),
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_table<'a>(entries: impl IntoIterator<Item = (&'a str, Embedding)>) -> Self {
        let mut embedder = Self::new(Vec::new());
        embedder.table = entries
            .into_iter()
            .map(|(text, v)| (text.to_string(), v))
            .collect();
        embedder
    }

    /// queue outcomes that take precedence over the table
    pub fn push(&self, outcome: Result<Embedding, EmbeddingError>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl Embedder for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());

        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return outcome;
        }
        self.table
            .get(text)
            .cloned()
            .ok_or(EmbeddingError::Unimplemented("scripted"))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn test_config(provider: ProviderKind) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        embedding_provider: provider,
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: "http://127.0.0.1:9".to_string(),
        openai_embedding_model: "text-embedding-ada-002".to_string(),
        deepseek_api_key: None,
        embedding_timeout: Duration::from_secs(1),
        hash_embedding_dimensions: 16,
    }
}

pub fn new_service(name: &str, description: &str) -> NewService {
    NewService {
        provider_id: "provider-1".to_string(),
        name: name.to_string(),
        description: description.to_string(),
        categories: vec!["Data".to_string()],
        tags: None,
        api: ApiConfig {
            endpoint: "https://api.example.com/v1".to_string(),
            method: HttpMethod::Get,
            input_schema: None,
            output_schema: None,
        },
        openapi_spec: None,
    }
}
