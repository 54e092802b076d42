//! Provider-agnostic embedding facade.
//!
//! Construct once, wrap in `Arc`, and share. Dispatches to the concrete client
//! selected by [`EmbeddingModelConfig::provider`] and splits large inputs into
//! `batch_size` requests, concatenating results in input order.

use tracing::{debug, info};

use crate::{
    config::{EmbeddingModelConfig, EmbeddingProviderKind},
    error_handler::{EmbeddingError, ProviderError},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

enum Backend {
    OpenAI(OpenAiService),
    Ollama(OllamaService),
}

/// Shared embedding service (one model, one backend).
pub struct EmbeddingService {
    backend: Backend,
    cfg: EmbeddingModelConfig,
}

impl EmbeddingService {
    /// Creates the service and its underlying HTTP client.
    ///
    /// # Errors
    /// Returns [`EmbeddingError`] when the config is invalid or the client
    /// cannot be built.
    pub fn new(cfg: EmbeddingModelConfig) -> Result<Self, EmbeddingError> {
        cfg.validate()?;
        let backend = match cfg.provider {
            EmbeddingProviderKind::OpenAI => Backend::OpenAI(OpenAiService::new(cfg.clone())?),
            EmbeddingProviderKind::Ollama => Backend::Ollama(OllamaService::new(cfg.clone())?),
        };
        info!(
            provider = ?cfg.provider,
            model = %cfg.model,
            batch_size = cfg.batch_size,
            "EmbeddingService ready"
        );
        Ok(Self { backend, cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &EmbeddingModelConfig {
        &self.cfg
    }

    /// Embeds a single text (query path).
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut out = self.request(&[text.to_string()]).await?;
        out.pop().ok_or_else(|| {
            ProviderError::CountMismatch { want: 1, got: 0 }.into()
        })
    }

    /// Embeds many texts, order-preserving and 1:1 with the input.
    pub async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.cfg.batch_size.max(1)) {
            debug!(chunk = chunk.len(), done = out.len(), "embedding batch");
            out.extend(self.request(chunk).await?);
        }
        Ok(out)
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match &self.backend {
            Backend::OpenAI(cli) => cli.embeddings(inputs).await,
            Backend::Ollama(cli) => cli.embeddings(inputs).await,
        }
    }
}
