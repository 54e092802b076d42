//! [`EmbeddingsProvider`] backed by the shared [`EmbeddingService`].

use embedding_service::EmbeddingService;
use futures::FutureExt;

use super::{EmbedFuture, EmbeddingsProvider};

impl EmbeddingsProvider for EmbeddingService {
    fn embed_one<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>> {
        async move { Ok(EmbeddingService::embed_one(self, text).await?) }.boxed()
    }

    fn embed_many<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        async move { Ok(EmbeddingService::embed_many(self, texts).await?) }.boxed()
    }
}
