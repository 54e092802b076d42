//! Vector store adapter: collection lifecycle, upsert, filtered similarity
//! search and listing over an injected [`VectorIndex`] and
//! [`EmbeddingsProvider`].

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::embed::EmbeddingsProvider;
use crate::errors::{ReviewError, ReviewResult};
use crate::filters;
use crate::ids::point_id;
use crate::index::{VectorIndex, VectorPoint};
use crate::record::{
    FilterSpec, PointListItem, PointListing, ReviewMetadata, SimilarityHits,
};

/// Text embedded once to learn the model's vector size.
pub const DIMENSION_PROBE: &str = "liquide review";

/// Characters of the stored document shown in listings.
const LISTING_SNIPPET_CHARS: usize = 220;

pub struct VectorStoreAdapter {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingsProvider>,
    collection: String,
    dim: OnceCell<usize>,
}

impl VectorStoreAdapter {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingsProvider>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            index,
            embedder,
            collection: collection.into(),
            dim: OnceCell::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Vector size of the embedding model, probed once and cached.
    pub async fn vector_dim(&self) -> ReviewResult<usize> {
        self.dim
            .get_or_try_init(|| async {
                let probe = self.embedder.embed_one(DIMENSION_PROBE).await?;
                if probe.is_empty() {
                    return Err(ReviewError::Embedding("probe embedding is empty".into()));
                }
                debug!(dim = probe.len(), "embedding dimension probed");
                Ok(probe.len())
            })
            .await
            .copied()
    }

    /// Creates the collection (cosine, probed dimension) unless it exists.
    pub async fn ensure_collection(&self) -> ReviewResult<()> {
        if self.index.collection_exists(&self.collection).await? {
            return Ok(());
        }
        let dim = self.vector_dim().await?;
        self.index.create_collection(&self.collection, dim).await?;
        info!(collection = %self.collection, dim, "collection created");
        Ok(())
    }

    /// Embeds `documents` in one call and writes one point per review.
    ///
    /// The payload is the metadata plus the text under `document`; existing
    /// points with the same derived id are overwritten.
    pub async fn upsert(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[ReviewMetadata],
    ) -> ReviewResult<usize> {
        if ids.len() != documents.len() || ids.len() != metadatas.len() {
            return Err(ReviewError::Index(format!(
                "length mismatch: ids={}, documents={}, metadatas={}",
                ids.len(),
                documents.len(),
                metadatas.len()
            )));
        }
        if ids.is_empty() {
            debug!("no points provided for upsert");
            return Ok(0);
        }

        self.ensure_collection().await?;
        let vectors = self.embedder.embed_many(documents).await?;
        if vectors.len() != ids.len() {
            return Err(ReviewError::Embedding(format!(
                "embedding count mismatch: want {}, got {}",
                ids.len(),
                vectors.len()
            )));
        }

        let mut points = Vec::with_capacity(ids.len());
        for (((id, doc), meta), vector) in ids.iter().zip(documents).zip(metadatas).zip(vectors) {
            let mut payload = match serde_json::to_value(meta)? {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            payload.insert("document".into(), Value::String(doc.clone()));
            points.push(VectorPoint {
                id: point_id(id),
                vector,
                payload,
            });
        }

        let written = self.index.upsert(&self.collection, points).await?;
        info!(collection = %self.collection, points = written, "reviews upserted");
        Ok(written)
    }

    /// Embeds `query_text` and returns up to `limit` hits in descending relevance.
    pub async fn similarity_query(
        &self,
        query_text: &str,
        limit: usize,
        filter: Option<&FilterSpec>,
    ) -> ReviewResult<SimilarityHits> {
        self.ensure_collection().await?;
        let vector = self.embedder.embed_one(query_text).await?;
        let points = self
            .index
            .search(&self.collection, vector, limit, filter)
            .await?;

        let mut hits = SimilarityHits::default();
        for p in points {
            let mut meta = p.payload;
            let document = match meta.remove("document") {
                Some(Value::String(s)) => s,
                _ => String::new(),
            };
            let id = match meta.get("id") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                _ => p.id.to_string(),
            };
            hits.ids.push(id);
            hits.documents.push(document);
            hits.metadatas.push(meta);
            hits.scores.push(p.score);
        }
        debug!(hits = hits.len(), filtered = filter.is_some(), "similarity query done");
        Ok(hits)
    }

    /// See [`filters::build_filter`].
    pub fn build_filter(
        &self,
        device: &str,
        ratings: &[i64],
        country: &str,
        version: &str,
        start_ts: Option<i64>,
        end_ts: Option<i64>,
    ) -> Option<FilterSpec> {
        filters::build_filter(device, ratings, country, version, start_ts, end_ts)
    }

    /// Drops the collection (best effort) and recreates it empty.
    pub async fn clear_and_recreate(&self) -> ReviewResult<()> {
        match self.index.collection_exists(&self.collection).await {
            Ok(true) => match self.index.delete_collection(&self.collection).await {
                Ok(()) => info!(collection = %self.collection, "collection deleted"),
                Err(e) => warn!(collection = %self.collection, error = %e, "collection delete failed"),
            },
            Ok(false) => info!(collection = %self.collection, "collection not found, skipping delete"),
            Err(e) => warn!(collection = %self.collection, error = %e, "collection existence check failed"),
        }
        self.ensure_collection().await
    }

    /// Up to `limit` stored reviews plus the collection size.
    pub async fn list_points(&self, limit: usize) -> ReviewResult<PointListing> {
        self.ensure_collection().await?;
        let points = self.index.scroll(&self.collection, limit).await?;
        let items = points.into_iter().map(|p| listing_item(&p.payload)).collect();
        let total_docs = self.index.count(&self.collection).await?;
        Ok(PointListing { total_docs, items })
    }

    pub async fn total_points(&self) -> ReviewResult<u64> {
        self.ensure_collection().await?;
        self.index.count(&self.collection).await
    }
}

fn listing_item(payload: &Map<String, Value>) -> PointListItem {
    let text = |k: &str| payload.get(k).and_then(Value::as_str).map(str::to_string);
    PointListItem {
        id: text("id"),
        title: text("title"),
        rating: payload.get("rating").and_then(Value::as_i64),
        snippet: payload
            .get("document")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .chars()
            .take(LISTING_SNIPPET_CHARS)
            .collect(),
        date: text("date"),
        version: text("version"),
        device: text("device"),
        country: text("country"),
    }
}
