//! Embedding model configuration loaded from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `EMBEDDING_PROVIDER`     = `openai` (default) | `ollama`
//! - `EMBEDDING_MODEL`        = model id (default `text-embedding-3-small`)
//! - `EMBEDDING_BATCH_SIZE`   = max inputs per request (default 128)
//! - `EMBEDDING_TIMEOUT_SECS` = request timeout (default 60)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY`  (required)
//! - `OPENAI_BASE_URL` (default `https://api.openai.com`)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` (one is required)

use crate::error_handler::{
    ConfigError, EmbeddingError, env_opt, env_opt_u64, env_opt_usize, must_env,
    validate_http_endpoint,
};

const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com";
const DEFAULT_BATCH: usize = 128;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Backend that computes embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingProviderKind {
    /// OpenAI-compatible `/v1/embeddings`.
    OpenAI,
    /// Local Ollama runtime (`/api/embed`).
    Ollama,
}

impl EmbeddingProviderKind {
    /// Parses a provider name (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "chatgpt" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Configuration of the embedding model invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingModelConfig {
    /// Provider/backend.
    pub provider: EmbeddingProviderKind,
    /// Model identifier (e.g. `text-embedding-3-small`, `bge-m3`).
    pub model: String,
    /// Base URL without the API path.
    pub endpoint: String,
    /// API key for authenticated providers.
    pub api_key: Option<String>,
    /// Max number of inputs sent per HTTP request.
    pub batch_size: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl EmbeddingModelConfig {
    /// Builds the config strictly from environment variables.
    ///
    /// # Errors
    /// - [`ConfigError::MissingVar`] for a missing key/endpoint
    /// - [`ConfigError::InvalidNumber`] for malformed numeric vars
    /// - [`ConfigError::UnsupportedProvider`] for an unknown provider
    pub fn from_env() -> Result<Self, EmbeddingError> {
        let provider = match env_opt("EMBEDDING_PROVIDER") {
            Some(p) => EmbeddingProviderKind::parse(&p)?,
            None => EmbeddingProviderKind::OpenAI,
        };
        let model = env_opt("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let batch_size = env_opt_usize("EMBEDDING_BATCH_SIZE")?.unwrap_or(DEFAULT_BATCH);
        let timeout_secs = env_opt_u64("EMBEDDING_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let (endpoint, api_key) = match provider {
            EmbeddingProviderKind::OpenAI => {
                let key = must_env("OPENAI_API_KEY")?;
                let base =
                    env_opt("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE.to_string());
                (base, Some(key))
            }
            EmbeddingProviderKind::Ollama => (ollama_endpoint()?, None),
        };

        let cfg = Self {
            provider,
            model,
            endpoint,
            api_key,
            batch_size,
            timeout_secs,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("embedding endpoint", &self.endpoint)?;
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidNumber {
                var: "EMBEDDING_BATCH_SIZE",
                reason: "must be > 0",
            }
            .into());
        }
        if self.provider == EmbeddingProviderKind::OpenAI && self.api_key.is_none() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY").into());
        }
        Ok(())
    }
}

/// Resolves the Ollama endpoint.
///
/// Precedence: `OLLAMA_URL`, then `OLLAMA_PORT` → `http://localhost:{port}`.
fn ollama_endpoint() -> Result<String, EmbeddingError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> EmbeddingModelConfig {
        EmbeddingModelConfig {
            provider: EmbeddingProviderKind::Ollama,
            model: "bge-m3".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            batch_size: 16,
            timeout_secs: 30,
        }
    }

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!(
            EmbeddingProviderKind::parse("OpenAI").unwrap(),
            EmbeddingProviderKind::OpenAI
        );
        assert_eq!(
            EmbeddingProviderKind::parse(" ollama ").unwrap(),
            EmbeddingProviderKind::Ollama
        );
        assert!(EmbeddingProviderKind::parse("anthropic").is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(base().validate().is_ok());

        let mut c = base();
        c.model = " ".into();
        assert!(c.validate().is_err());

        let mut c = base();
        c.batch_size = 0;
        assert!(c.validate().is_err());

        let mut c = base();
        c.provider = EmbeddingProviderKind::OpenAI;
        assert!(c.validate().is_err());
    }
}
