//! The embedding-endpoint HTTP client: an [`EmbeddingProvider`] that talks
//! to a plain Ollama-style `/api/embeddings` endpoint, grounded in the
//! request/response shape the teacher's `embedding` constants module
//! already names (`OLLAMA_DEFAULT_PORT`, `EMBEDDING_RESPONSE_FIELD`, ...)
//! and in the request-building style of the `openai` embeddings provider
//! in the retrieval pack (one `reqwest::Client`, a typed request struct,
//! map HTTP/JSON failures into the core's error taxonomy).

use cocosearch_domain::constants::{EMBEDDING_PREWARM_TIMEOUT_SECS, EMBEDDING_REQUEST_TIMEOUT_SECS};
use cocosearch_domain::error::{CocoError, Result};
use cocosearch_domain::ports::EmbeddingProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default scheme/host/port for a local Ollama-style endpoint, overridden
/// by `COCOSEARCH_OLLAMA_URL` at the facade layer.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// HTTP-backed [`EmbeddingProvider`] hitting `{endpoint}/api/embeddings`.
/// `dimension` is fixed once, from a pre-warm call or a caller-supplied
/// value, for the lifetime of the provider — matching the model's
/// load-time-fixed dimensionality spec §6 describes.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimension: std::sync::OnceLock<usize>,
}

impl HttpEmbeddingProvider {
    /// Build a provider against `endpoint` (e.g. `http://localhost:11434`)
    /// using `model` for every request.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(EMBEDDING_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CocoError::infrastructure_with_source("build embedding HTTP client", e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            dimension: std::sync::OnceLock::new(),
        })
    }

    fn embeddings_url(&self) -> String {
        format!("{}/api/embeddings", self.endpoint.trim_end_matches('/'))
    }

    async fn request(&self, prompt: &str, timeout: Duration) -> Result<Vec<f32>> {
        let body = EmbeddingRequest { model: &self.model, prompt };
        let response = self
            .client
            .post(self.embeddings_url())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                CocoError::infrastructure_with_source(
                    format!("embedding endpoint {} unreachable", self.endpoint),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CocoError::infrastructure(format!(
                "embedding endpoint returned {status}: {text}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| CocoError::infrastructure_with_source("decode embedding response", e))?;
        Ok(parsed.embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let timeout = Duration::from_secs(EMBEDDING_REQUEST_TIMEOUT_SECS);
        let vector = self.request(text, timeout).await?;
        let _ = self.dimension.set(vector.len());
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension.get().copied().unwrap_or_default()
    }

    async fn prewarm(&self) -> Result<()> {
        let timeout = Duration::from_secs(EMBEDDING_PREWARM_TIMEOUT_SECS);
        let vector = self.request("cocosearch prewarm", timeout).await?;
        let _ = self.dimension.set(vector.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeddings_url_strips_trailing_slash() {
        let provider = HttpEmbeddingProvider::new("http://localhost:11434/", "nomic-embed-text").unwrap();
        assert_eq!(provider.embeddings_url(), "http://localhost:11434/api/embeddings");
    }

    #[test]
    fn dimension_is_zero_before_any_request() {
        let provider = HttpEmbeddingProvider::new(DEFAULT_ENDPOINT, "nomic-embed-text").unwrap();
        assert_eq!(provider.dimension(), 0);
    }
}
