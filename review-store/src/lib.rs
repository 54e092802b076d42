//! High-level review RAG facade: normalization, indexing and filtered retrieval
//! of app-store reviews over Qdrant.
//!
//! This crate provides:
//! - Normalization of heterogeneous raw reviews into one canonical shape
//! - A vector store adapter with deterministic point ids and metadata filters
//! - Batch and live (Google Play + App Store) ingestion
//! - Filtered semantic retrieval with a date-range post-filter
//!
//! Capabilities (vector index, embeddings, store providers) are injected, so
//! the same pipeline runs against Qdrant or the in-memory index.

mod config;
mod dates;
mod embed;
mod errors;
mod filters;
mod ids;
mod index;
mod ingest;
mod instructions;
mod normalize;
mod record;
mod retrieve;
mod vector_store;

pub use config::{NormalizeConfig, QdrantConfig, RetrievalConfig, StoreConfig, VersionCutovers};
pub use dates::parse_date;
pub use embed::{EmbedFuture, EmbeddingsProvider};
pub use errors::{ReviewError, ReviewResult};
pub use filters::{build_filter, to_qdrant_filter};
pub use ids::point_id;
pub use index::{InMemoryIndex, IndexFuture, QdrantIndex, ScoredPoint, StoredPoint, VectorIndex, VectorPoint};
pub use ingest::{IngestionPipeline, LiveIngestParams, LiveSources, fetch_live, preview_payload};
pub use instructions::NEXT_ACTION;
pub use normalize::{classify_version, extract_list, normalize, normalize_all, project};
pub use record::{
    AppliedFilterSet, AppliedFilters, Evidence, EvidenceMetadata, FilterSpec, IngestSummary,
    LiveRefreshOutcome, NormalizedReview, PayloadPreview, PointListItem, PointListing,
    ProjectedBatch, RetrievalResult, ReviewMetadata, SimilarityHits, TimestampRange,
};
pub use retrieve::{QueryEngine, QueryRequest};
pub use vector_store::{DIMENSION_PROBE, VectorStoreAdapter};

use std::sync::Arc;

use tracing::trace;

/// Wires one adapter into an ingestion pipeline and a query engine.
///
/// This is the single entry point recommended for application code.
pub struct ReviewRag {
    store: Arc<VectorStoreAdapter>,
    pipeline: IngestionPipeline,
    engine: QueryEngine,
}

impl ReviewRag {
    /// Builds the facade over explicit capabilities.
    pub fn new(
        cfg: StoreConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Self {
        trace!(collection = %cfg.qdrant.collection, "ReviewRag::new");
        let store = Arc::new(VectorStoreAdapter::new(
            index,
            embedder,
            cfg.qdrant.collection.clone(),
        ));
        let pipeline = IngestionPipeline::new(store.clone(), cfg.normalize.clone(), &cfg.sample_path);
        let engine = QueryEngine::new(store.clone(), cfg.retrieval.clone());
        Self {
            store,
            pipeline,
            engine,
        }
    }

    /// Builds the facade over a Qdrant index described by `cfg`.
    ///
    /// # Errors
    /// Returns [`ReviewError::Config`] or [`ReviewError::Index`] when the
    /// config is invalid or the client cannot be built.
    pub fn connect(cfg: StoreConfig, embedder: Arc<dyn EmbeddingsProvider>) -> ReviewResult<Self> {
        cfg.validate()?;
        let index = Arc::new(QdrantIndex::new(&cfg.qdrant)?);
        Ok(Self::new(cfg, index, embedder))
    }

    pub fn store(&self) -> &Arc<VectorStoreAdapter> {
        &self.store
    }

    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.pipeline
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }
}
