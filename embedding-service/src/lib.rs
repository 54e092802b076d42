//! Embedding capability used by the review index.
//!
//! - One [`EmbeddingService`] per process, constructed from
//!   [`EmbeddingModelConfig`] and shared behind an `Arc`.
//! - Enum dispatch over thin HTTP clients (OpenAI, Ollama); no trait objects.
//! - Batch requests are split by `batch_size` and reassembled in input order.
//!
//! # Example
//! ```no_run
//! use embedding_service::{EmbeddingModelConfig, EmbeddingService};
//!
//! # async fn run() -> Result<(), embedding_service::EmbeddingError> {
//! let cfg = EmbeddingModelConfig::from_env()?;
//! let svc = EmbeddingService::new(cfg)?;
//! let one = svc.embed_one("great app, fast support").await?;
//! let many = svc.embed_many(&["a".to_string(), "b".to_string()]).await?;
//! assert_eq!(many.len(), 2);
//! println!("dim = {}", one.len());
//! # Ok(()) }
//! ```

pub mod config;
pub mod error_handler;
pub mod service;
pub mod services;
pub mod telemetry;

pub use config::{EmbeddingModelConfig, EmbeddingProviderKind};
pub use error_handler::{ConfigError, EmbeddingError, ProviderError};
pub use service::EmbeddingService;
