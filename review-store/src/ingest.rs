//! Ingestion pipeline: raw payload → normalized reviews → indexed points.
//!
//! Live variants pull both app stores through [`ReviewSource`]s first
//! (Google Play, then Apple). `refresh_live` rebuilds the collection from live
//! data merged with the local sample dataset, optionally falling back to the
//! sample alone.

use std::path::Path;
use std::sync::Arc;

use review_providers::{ReviewSource, SerpApiConfig, collect_reviews};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::NormalizeConfig;
use crate::errors::{ReviewError, ReviewResult};
use crate::normalize::{extract_list, normalize_all, project};
use crate::record::{IngestSummary, LiveRefreshOutcome, PayloadPreview};
use crate::vector_store::VectorStoreAdapter;

/// Paging and tagging parameters for live ingestion.
#[derive(Debug, Clone)]
pub struct LiveIngestParams {
    /// Page ceiling per store.
    pub max_pages: usize,
    /// Country stamped on every fetched review.
    pub country: String,
}

impl Default for LiveIngestParams {
    fn default() -> Self {
        Self {
            max_pages: 2,
            country: "India".to_string(),
        }
    }
}

impl LiveIngestParams {
    pub fn from_serpapi(cfg: &SerpApiConfig) -> Self {
        Self {
            max_pages: cfg.max_pages,
            country: cfg.source_country.clone(),
        }
    }
}

/// The two store sources, fetched in field order.
pub struct LiveSources<S> {
    pub google_play: S,
    pub apple: S,
}

pub struct IngestionPipeline {
    store: Arc<VectorStoreAdapter>,
    normalize: NormalizeConfig,
    sample_path: std::path::PathBuf,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<VectorStoreAdapter>,
        normalize: NormalizeConfig,
        sample_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            store,
            normalize,
            sample_path: sample_path.as_ref().to_path_buf(),
        }
    }

    /// Normalizes and indexes every review in `payload`.
    ///
    /// # Errors
    /// [`ReviewError::Validation`] for unsupported payload shapes; index and
    /// embedding failures propagate.
    pub async fn ingest_from_payload(&self, payload: Value) -> ReviewResult<IngestSummary> {
        let raw = extract_list(payload)?;
        self.index_raw(&raw).await
    }

    /// See [`preview_payload`].
    pub fn preview_payload(&self, payload: Value, limit: usize) -> ReviewResult<PayloadPreview> {
        preview_payload(payload, limit, &self.normalize)
    }

    /// See [`fetch_live`].
    pub async fn fetch_live<S>(&self, sources: &LiveSources<S>, params: &LiveIngestParams) -> Vec<Value>
    where
        S: ReviewSource + Sync,
    {
        fetch_live(sources, params).await
    }

    /// Fetches both stores and indexes the result.
    ///
    /// # Errors
    /// [`ReviewError::EmptyResult`] when neither store returned a review.
    pub async fn ingest_live<S>(
        &self,
        sources: &LiveSources<S>,
        params: &LiveIngestParams,
    ) -> ReviewResult<IngestSummary>
    where
        S: ReviewSource + Sync,
    {
        let raw = self.fetch_live(sources, params).await;
        if raw.is_empty() {
            return Err(empty_live());
        }
        self.index_raw(&raw).await
    }

    /// Clears the collection and indexes live reviews merged with the sample
    /// dataset.
    ///
    /// Any failure is returned as is when `fallback_to_sample` is off;
    /// otherwise the sample dataset alone is indexed and reported as
    /// [`LiveRefreshOutcome::FallbackToSample`].
    pub async fn refresh_live<S>(
        &self,
        sources: &LiveSources<S>,
        params: &LiveIngestParams,
        fallback_to_sample: bool,
    ) -> ReviewResult<LiveRefreshOutcome>
    where
        S: ReviewSource + Sync,
    {
        let original = match self.refresh_merged(sources, params).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if !fallback_to_sample => return Err(e),
            Err(e) => e,
        };
        warn!(error = %original, "live refresh failed, indexing sample dataset");
        self.fallback_to_sample(original.to_string()).await
    }

    /// Rebuilds the collection from the sample dataset alone, reporting
    /// `reason` as the live failure.
    ///
    /// # Errors
    /// [`ReviewError::Fallback`] carrying both messages when this fails too.
    pub async fn fallback_to_sample(&self, reason: String) -> ReviewResult<LiveRefreshOutcome> {
        let attempt = async {
            self.store.clear_and_recreate().await?;
            self.ingest_sample().await
        };
        match attempt.await {
            Ok(ingest_result) => Ok(LiveRefreshOutcome::FallbackToSample {
                reason,
                ingest_result,
            }),
            Err(fallback) => {
                error!(original = %reason, fallback = %fallback, "sample fallback failed");
                Err(ReviewError::Fallback {
                    original: reason,
                    fallback: fallback.to_string(),
                })
            }
        }
    }

    async fn refresh_merged<S>(
        &self,
        sources: &LiveSources<S>,
        params: &LiveIngestParams,
    ) -> ReviewResult<LiveRefreshOutcome>
    where
        S: ReviewSource + Sync,
    {
        self.store.clear_and_recreate().await?;
        let mut merged = self.fetch_live(sources, params).await;
        if merged.is_empty() {
            return Err(empty_live());
        }
        let live_count = merged.len();
        let sample = self.load_sample().await?;
        let sample_count = sample.len();
        merged.extend(sample);

        let merged_count = merged.len();
        let ingest_result = self.index_raw(&merged).await?;
        Ok(LiveRefreshOutcome::Ok {
            live_count,
            sample_count,
            merged_count,
            ingest_result,
        })
    }

    /// Indexes the sample dataset on its own.
    pub async fn ingest_sample(&self) -> ReviewResult<IngestSummary> {
        let raw = self.load_sample().await?;
        self.index_raw(&raw).await
    }

    async fn load_sample(&self) -> ReviewResult<Vec<Value>> {
        let text = tokio::fs::read_to_string(&self.sample_path).await?;
        extract_list(serde_json::from_str(&text)?)
    }

    async fn index_raw(&self, raw: &[Value]) -> ReviewResult<IngestSummary> {
        let batch = project(&normalize_all(raw, &self.normalize));
        let inserted = self
            .store
            .upsert(&batch.ids, &batch.documents, &batch.metadatas)
            .await?;
        let total_docs = self.store.total_points().await?;
        info!(inserted, total_docs, "reviews indexed");
        Ok(IngestSummary::ok(inserted, total_docs))
    }
}

/// Normalized documents and metadata for `payload`, without indexing.
/// `count` is the full size; the lists are cut to `limit`.
pub fn preview_payload(
    payload: Value,
    limit: usize,
    cfg: &NormalizeConfig,
) -> ReviewResult<PayloadPreview> {
    let raw = extract_list(payload)?;
    let mut batch = project(&normalize_all(&raw, cfg));
    let count = batch.len();
    batch.documents.truncate(limit);
    batch.metadatas.truncate(limit);
    Ok(PayloadPreview {
        count,
        documents: batch.documents,
        metadatas: batch.metadatas,
    })
}

/// Raw reviews from both stores (Google Play first), tagged with device and
/// country. Provider errors only shorten the result.
pub async fn fetch_live<S>(sources: &LiveSources<S>, params: &LiveIngestParams) -> Vec<Value>
where
    S: ReviewSource + Sync,
{
    let play = collect_reviews(&sources.google_play, params.max_pages, &params.country).await;
    let apple = collect_reviews(&sources.apple, params.max_pages, &params.country).await;

    let (android, ios) = (play.reviews.len(), apple.reviews.len());
    let mut merged = play.reviews;
    merged.extend(apple.reviews);
    info!(android, ios, total = merged.len(), "live reviews collected");
    merged
}

fn empty_live() -> ReviewError {
    ReviewError::EmptyResult("no live reviews fetched from Google Play/App Store".into())
}
