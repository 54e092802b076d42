//! Configuration layer: reads runtime settings from environment variables and
//! exposes strongly typed configs for Qdrant, normalization and retrieval.

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};

use crate::dates::parse_date;
use crate::errors::{ReviewError, ReviewResult};

/// Qdrant connectivity and collection parameters.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// gRPC URL for Qdrant (e.g., "http://localhost:6334").
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            collection: "liquide_reviews".to_string(),
        }
    }
}

/// Release cutovers used to bucket undated-version reviews into v1/v2/v3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCutovers {
    /// First instant of v2 (inclusive).
    pub v2_start: DateTime<Utc>,
    /// First instant of v3 (inclusive).
    pub v3_start: DateTime<Utc>,
}

impl Default for VersionCutovers {
    fn default() -> Self {
        Self {
            v2_start: day_start(2025, 5, 25),
            v3_start: day_start(2025, 10, 4),
        }
    }
}

fn day_start(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Knobs applied while normalizing raw reviews.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Maximum review text length, in characters.
    pub max_document_chars: usize,
    pub cutovers: VersionCutovers,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_document_chars: 600,
            cutovers: VersionCutovers::default(),
        }
    }
}

/// Retrieval limits.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Over-fetch limit passed to the vector index.
    pub query_limit: usize,
    /// Maximum evidence items returned after date post-filtering.
    pub evidence_cap: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            query_limit: 12,
            evidence_cap: 12,
        }
    }
}

/// Top-level runtime configuration for the review store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub qdrant: QdrantConfig,
    pub normalize: NormalizeConfig,
    pub retrieval: RetrievalConfig,
    /// Local sample dataset used by live refresh (merge and fallback).
    pub sample_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            qdrant: QdrantConfig::default(),
            normalize: NormalizeConfig::default(),
            retrieval: RetrievalConfig::default(),
            sample_path: PathBuf::from("sample_data/reviews_sample.json"),
        }
    }
}

impl StoreConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION_NAME` (default: "liquide_reviews")
    /// - `REVIEW_MAX_DOCUMENT_CHARS` (default: 600)
    /// - `REVIEW_V2_START` (default: 2025-05-25)
    /// - `REVIEW_V3_START` (default: 2025-10-04)
    /// - `REVIEW_QUERY_LIMIT` (default: 12)
    /// - `REVIEW_EVIDENCE_CAP` (default: 12)
    /// - `REVIEWS_SAMPLE_PATH` (default: `sample_data/reviews_sample.json`)
    pub fn from_env() -> ReviewResult<Self> {
        let defaults = Self::default();

        let qdrant = QdrantConfig {
            url: read_string_env("QDRANT_URL").unwrap_or(defaults.qdrant.url),
            api_key: read_string_env("QDRANT_API_KEY"),
            collection: read_string_env("QDRANT_COLLECTION_NAME")
                .unwrap_or(defaults.qdrant.collection),
        };

        let cutovers = VersionCutovers {
            v2_start: read_date_env("REVIEW_V2_START")?
                .unwrap_or(defaults.normalize.cutovers.v2_start),
            v3_start: read_date_env("REVIEW_V3_START")?
                .unwrap_or(defaults.normalize.cutovers.v3_start),
        };

        let normalize = NormalizeConfig {
            max_document_chars: read_usize_env("REVIEW_MAX_DOCUMENT_CHARS")?
                .unwrap_or(defaults.normalize.max_document_chars),
            cutovers,
        };

        let retrieval = RetrievalConfig {
            query_limit: read_usize_env("REVIEW_QUERY_LIMIT")?
                .unwrap_or(defaults.retrieval.query_limit),
            evidence_cap: read_usize_env("REVIEW_EVIDENCE_CAP")?
                .unwrap_or(defaults.retrieval.evidence_cap),
        };

        let sample_path = read_string_env("REVIEWS_SAMPLE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.sample_path);

        let cfg = Self {
            qdrant,
            normalize,
            retrieval,
            sample_path,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> ReviewResult<()> {
        if self.qdrant.url.trim().is_empty() {
            return Err(ReviewError::Config("qdrant url is empty".into()));
        }
        if self.qdrant.collection.trim().is_empty() {
            return Err(ReviewError::Config("collection is empty".into()));
        }
        if self.normalize.max_document_chars == 0 {
            return Err(ReviewError::Config("max_document_chars must be > 0".into()));
        }
        if self.normalize.cutovers.v2_start > self.normalize.cutovers.v3_start {
            return Err(ReviewError::Config("v2 cutover must not be after v3 cutover".into()));
        }
        if self.retrieval.query_limit == 0 || self.retrieval.evidence_cap == 0 {
            return Err(ReviewError::Config("query_limit and evidence_cap must be > 0".into()));
        }
        Ok(())
    }
}

fn read_string_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_usize_env(key: &str) -> ReviewResult<Option<usize>> {
    read_string_env(key)
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|e| ReviewError::Config(format!("{key}={raw:?}: {e}")))
        })
        .transpose()
}

fn read_date_env(key: &str) -> ReviewResult<Option<DateTime<Utc>>> {
    read_string_env(key)
        .map(|raw| {
            parse_date(&raw)
                .ok_or_else(|| ReviewError::Config(format!("{key}={raw:?} is not a date")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = StoreConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.normalize.max_document_chars, 600);
        assert_eq!(cfg.normalize.cutovers.v3_start.timestamp(), 1_759_536_000);
    }

    #[test]
    fn inverted_cutovers_are_rejected() {
        let mut cfg = StoreConfig::default();
        std::mem::swap(
            &mut cfg.normalize.cutovers.v2_start,
            &mut cfg.normalize.cutovers.v3_start,
        );
        assert!(matches!(cfg.validate(), Err(ReviewError::Config(_))));
    }
}
