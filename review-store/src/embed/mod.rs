use futures::future::BoxFuture;

use crate::errors::ReviewError;

/// Boxed future returned by embedding providers.
pub type EmbedFuture<'a, T> = BoxFuture<'a, Result<T, ReviewError>>;

/// Provider interface for embedding generation.
///
/// Implementations must return vectors of one fixed dimensionality, and
/// `embed_many` must be order-preserving and 1:1 with its input.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed_one<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>>;

    fn embed_many<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>>;
}

pub mod service;
