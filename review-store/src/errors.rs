//! Unified error types for the crate.

use embedding_service::EmbeddingError;
use review_providers::ProviderError;
use thiserror::Error;

/// Convenient alias for results of this crate.
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Top-level error for review-store operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Payload does not have an accepted shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// Store-review provider failure.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A fetch produced no reviews at all.
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// Vector index failures (Qdrant or in-memory), passed through as text.
    #[error("index error: {0}")]
    Index(String),

    /// Embedding backend failures.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Live refresh failed and so did the sample-dataset fallback.
    #[error("live ingestion failed: {original}. Sample fallback failed: {fallback}")]
    Fallback { original: String, fallback: String },
}

impl From<EmbeddingError> for ReviewError {
    fn from(e: EmbeddingError) -> Self {
        ReviewError::Embedding(e.to_string())
    }
}

impl From<qdrant_client::QdrantError> for ReviewError {
    fn from(e: qdrant_client::QdrantError) -> Self {
        ReviewError::Index(e.to_string())
    }
}
