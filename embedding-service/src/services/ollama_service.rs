//! Lightweight Ollama embeddings client.
//!
//! - `POST {endpoint}/api/embed`: batch embeddings (`input` is an array,
//!   response is `{ embeddings: number[][] }` in input order)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{EmbeddingModelConfig, EmbeddingProviderKind};
use crate::error_handler::{
    ConfigError, EmbeddingError, ProviderError, make_snippet, validate_http_endpoint,
};

/// Thin client for Ollama embeddings.
pub struct OllamaService {
    client: reqwest::Client,
    cfg: EmbeddingModelConfig,
    url_embed: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`ConfigError::UnsupportedProvider`] if `cfg.provider` is not Ollama
    /// - [`ConfigError::InvalidFormat`] if `cfg.endpoint` is invalid
    /// - [`EmbeddingError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: EmbeddingModelConfig) -> Result<Self, EmbeddingError> {
        if cfg.provider != EmbeddingProviderKind::Ollama {
            return Err(ConfigError::UnsupportedProvider(format!("{:?}", cfg.provider)).into());
        }
        validate_http_endpoint("OLLAMA_URL", &cfg.endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .brotli(true)
            .build()?;

        let base = cfg.endpoint.trim().trim_end_matches('/').to_string();
        let url_embed = format!("{base}/api/embed");

        Ok(Self {
            client,
            cfg,
            url_embed,
        })
    }

    /// Embeds a batch of inputs in one request.
    ///
    /// # Errors
    /// - [`ProviderError::HttpStatus`] for non-2xx responses
    /// - [`EmbeddingError::HttpTransport`] for client errors
    /// - [`ProviderError::Decode`] / [`ProviderError::CountMismatch`] on bad payloads
    #[instrument(skip_all, fields(model = %self.cfg.model, inputs = inputs.len()))]
    pub async fn embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbedRequest {
            model: &self.cfg.model,
            input: inputs,
        };

        debug!("POST {}", self.url_embed);
        let resp = self.client.post(&self.url_embed).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embed.clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&text),
            }
            .into());
        }

        let out: EmbedResponse = resp.json().await.map_err(|e| {
            ProviderError::Decode(format!(
                "serde error: {e}; expected `{{ embeddings: number[][] }}`"
            ))
        })?;

        if out.embeddings.len() != inputs.len() {
            return Err(ProviderError::CountMismatch {
                want: inputs.len(),
                got: out.embeddings.len(),
            }
            .into());
        }
        Ok(out.embeddings)
    }
}

/// Request body for `/api/embed`.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response body for `/api/embed`.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}
