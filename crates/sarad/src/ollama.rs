//! Ollama-compatible client for the embedding and generation services.
//!
//! The [`ModelBackend`] trait is the seam between the pipeline and the
//! network: production code uses [`OllamaBackend`], tests use scripted
//! fakes so they can count calls without a model running.

use async_trait::async_trait;
use sara_common::SaraError;
use std::time::Duration;

/// External model services consumed by the pipeline.
///
/// Callers treat every error identically to a timeout: degrade to the
/// fallback value, never propagate.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Fetch an embedding vector for a prompt.
    async fn embed(&self, model: &str, prompt: &str, timeout: Duration)
        -> Result<Vec<f32>, SaraError>;

    /// Run non-streaming text generation for a prompt.
    async fn generate(&self, model: &str, prompt: &str, timeout: Duration)
        -> Result<String, SaraError>;
}

/// HTTP backend against an Ollama-compatible API.
pub struct OllamaBackend {
    base_url: String,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn client(timeout: Duration) -> Result<reqwest::Client, SaraError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)
    }
}

fn transport(e: reqwest::Error) -> SaraError {
    SaraError::Ollama(e.to_string())
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    async fn embed(
        &self,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Vec<f32>, SaraError> {
        let body = serde_json::json!({
            "model": model,
            "prompt": prompt,
        });

        let response = Self::client(timeout)?
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(SaraError::Ollama(format!(
                "embedding request failed: {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(transport)?;
        let vector = json
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| SaraError::Ollama("embedding response missing vector".into()))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect::<Vec<f32>>();

        if vector.is_empty() {
            return Err(SaraError::Ollama("embedding response empty".into()));
        }

        Ok(vector)
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, SaraError> {
        let body = serde_json::json!({
            "model": model,
            "prompt": prompt,
            "stream": false
        });

        let response = Self::client(timeout)?
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(SaraError::Ollama(format!(
                "generate request failed: {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(transport)?;
        let text = json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .to_string();

        Ok(text)
    }
}
