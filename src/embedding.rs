use crate::providers::{check_well_formed, Embedder, Embedding, EmbeddingError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-ada-002";

#[derive(Debug, Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    input: Vec<&'a str>,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}

/// openai `/embeddings` backend
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| EmbeddingError::Unconfigured("OPENAI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Unconfigured(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let request = OpenAiEmbeddingRequest {
            input: vec![text],
            model: &self.model,
        };

        log::debug!("sending embedding request: model={}, chars={}", self.model, text.len());

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::RateLimited(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: OpenAiEmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| EmbeddingError::MalformedResponse(format!("failed to parse embedding response: {e}")))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::MalformedResponse("no embedding returned".to_string()))?;

        check_well_formed(&embedding)?;

        log::debug!(
            "generated embedding: dimension={}, first values={:?}",
            embedding.len(),
            &embedding[..embedding.len().min(5)]
        );

        Ok(embedding)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// placeholder for the deepseek backend. construction still demands a key so
/// that a misconfigured deployment fails at startup, but every call fails.
pub struct DeepSeekEmbedder {
    _api_key: String,
}

impl DeepSeekEmbedder {
    pub fn new(api_key: Option<String>) -> Result<Self, EmbeddingError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| EmbeddingError::Unconfigured("DEEPSEEK_API_KEY is not set".to_string()))?;

        logfire::warn!("deepseek embedder initialized as a placeholder; every call will fail");

        Ok(Self { _api_key: api_key })
    }
}

impl Embedder for DeepSeekEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        Err(EmbeddingError::Unimplemented("deepseek"))
    }

    fn name(&self) -> &'static str {
        "deepseek"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(server: &MockServer) -> OpenAiEmbedder {
        OpenAiEmbedder::new(
            Some("sk-test".to_string()),
            server.uri(),
            DEFAULT_OPENAI_MODEL.to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_openai_requires_api_key() {
        let missing = OpenAiEmbedder::new(
            None,
            DEFAULT_OPENAI_BASE_URL.to_string(),
            DEFAULT_OPENAI_MODEL.to_string(),
            Duration::from_secs(5),
        );
        assert!(matches!(missing, Err(EmbeddingError::Unconfigured(_))));

        let blank = OpenAiEmbedder::new(
            Some("  ".to_string()),
            DEFAULT_OPENAI_BASE_URL.to_string(),
            DEFAULT_OPENAI_MODEL.to_string(),
            Duration::from_secs(5),
        );
        assert!(matches!(blank, Err(EmbeddingError::Unconfigured(_))));
    }

    #[tokio::test]
    async fn test_openai_embed_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "input": ["weather forecasts"],
                "model": DEFAULT_OPENAI_MODEL
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.25, -0.5, 1.0], "index": 0}],
                "model": DEFAULT_OPENAI_MODEL
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embedding = embedder(&server).embed("weather forecasts").await.unwrap();
        assert_eq!(embedding, vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_openai_rate_limit_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = embedder(&server).embed("anything").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::RateLimited(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_openai_server_error_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = embedder(&server).embed("anything").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Api { status: 500, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_openai_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": "not a vector"}]
            })))
            .mount(&server)
            .await;

        let err = embedder(&server).embed("anything").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_openai_missing_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
            .mount(&server)
            .await;

        let err = embedder(&server).embed("anything").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_openai_connection_refused_is_transient() {
        // nothing listens on the discard port
        let embedder = OpenAiEmbedder::new(
            Some("sk-test".to_string()),
            "http://127.0.0.1:9".to_string(),
            DEFAULT_OPENAI_MODEL.to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = embedder.embed("anything").await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_deepseek_placeholder() {
        assert!(matches!(
            DeepSeekEmbedder::new(None),
            Err(EmbeddingError::Unconfigured(_))
        ));

        let embedder = DeepSeekEmbedder::new(Some("ds-key".to_string())).unwrap();
        let err = embedder.embed("anything").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Unimplemented("deepseek")));
        assert!(!err.is_transient());
    }
}
