//! Core data models: normalized reviews, filters, and operation reports.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical shape of one review after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedReview {
    pub id: String,
    pub title: String,
    /// Always within `1..=5`.
    pub rating: i64,
    pub review_text: String,
    /// `YYYY-MM-DD` (UTC) or empty when the source date is missing/unparseable.
    pub date: String,
    pub date_ts: Option<i64>,
    /// One of `v1`, `v2`, `v3`.
    pub version: String,
    pub device: String,
    pub country: String,
}

/// Indexed metadata of one review (everything but the text).
///
/// `device` and `country` are lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    pub id: String,
    pub title: String,
    pub rating: i64,
    pub date: String,
    pub date_ts: Option<i64>,
    pub version: String,
    pub device: String,
    pub country: String,
}

/// Parallel `(ids, documents, metadatas)` ready for indexing.
#[derive(Debug, Clone, Default)]
pub struct ProjectedBatch {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<ReviewMetadata>,
}

impl ProjectedBatch {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Inclusive `date_ts` range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampRange {
    pub gte: Option<i64>,
    pub lte: Option<i64>,
}

impl TimestampRange {
    pub fn contains(&self, ts: i64) -> bool {
        self.gte.is_none_or(|lo| ts >= lo) && self.lte.is_none_or(|hi| ts <= hi)
    }
}

/// Conjunctive metadata filter over indexed reviews.
///
/// String values are stored already trimmed and lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub device: Option<String>,
    /// Any-of set of ratings; empty means "no rating clause".
    pub ratings: Vec<i64>,
    pub country: Option<String>,
    pub version: Option<String>,
    pub date_range: Option<TimestampRange>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.device.is_none()
            && self.ratings.is_empty()
            && self.country.is_none()
            && self.version.is_none()
            && self.date_range.is_none()
    }

    /// Evaluates the filter against a stored payload.
    pub fn matches(&self, payload: &Map<String, Value>) -> bool {
        let eq = |key: &str, want: &Option<String>| match want {
            Some(w) => payload.get(key).and_then(Value::as_str) == Some(w.as_str()),
            None => true,
        };
        if !eq("device", &self.device) || !eq("country", &self.country) || !eq("version", &self.version) {
            return false;
        }
        if !self.ratings.is_empty() {
            let rating = payload.get("rating").and_then(Value::as_i64);
            if !rating.is_some_and(|r| self.ratings.contains(&r)) {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            let ts = payload.get("date_ts").and_then(Value::as_i64);
            if !ts.is_some_and(|t| range.contains(t)) {
                return false;
            }
        }
        true
    }
}

/// Similarity results as parallel arrays in descending relevance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimilarityHits {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    /// Stored payload without the `document` field.
    pub metadatas: Vec<Map<String, Value>>,
    pub scores: Vec<f32>,
}

impl SimilarityHits {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Metadata attached to one evidence item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceMetadata {
    pub id: String,
    pub rating: Option<i64>,
    pub date: Option<String>,
    pub version: Option<String>,
    pub device: String,
    pub country: String,
}

/// One retrieved review as handed to the answer generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub text: String,
    pub metadata: EvidenceMetadata,
}

/// Filters that were actually applied, keyed by their public names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFilterSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Canonical case: `iOS` or `Android`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl AppliedFilterSet {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFilters {
    pub qdrant_filter: AppliedFilterSet,
}

/// Result of one retrieval call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub question: String,
    pub retrieved_documents: Vec<Evidence>,
    pub applied_filters: AppliedFilters,
    pub notes: Vec<String>,
    pub next_action: String,
}

/// Outcome of indexing a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub status: String,
    /// Points written by this call (overwrites included).
    pub inserted_count: usize,
    /// Points in the collection after the call.
    pub total_docs: u64,
}

impl IngestSummary {
    pub fn ok(inserted_count: usize, total_docs: u64) -> Self {
        Self {
            status: "ok".to_string(),
            inserted_count,
            total_docs,
        }
    }
}

/// One row of a collection listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointListItem {
    pub id: Option<String>,
    pub title: Option<String>,
    pub rating: Option<i64>,
    /// First 220 characters of the stored document.
    pub snippet: String,
    pub date: Option<String>,
    pub version: Option<String>,
    pub device: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointListing {
    pub total_docs: u64,
    pub items: Vec<PointListItem>,
}

/// Normalized view of a payload without indexing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadPreview {
    /// Number of reviews in the whole payload.
    pub count: usize,
    pub documents: Vec<String>,
    pub metadatas: Vec<ReviewMetadata>,
}

/// Report of a live refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LiveRefreshOutcome {
    Ok {
        live_count: usize,
        sample_count: usize,
        merged_count: usize,
        ingest_result: IngestSummary,
    },
    FallbackToSample {
        reason: String,
        ingest_result: IngestSummary,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn filter_clauses_are_conjunctive() {
        let f = FilterSpec {
            device: Some("ios".into()),
            ratings: vec![5],
            ..Default::default()
        };
        assert!(f.matches(&payload(json!({"device": "ios", "rating": 5}))));
        assert!(!f.matches(&payload(json!({"device": "ios", "rating": 4}))));
        assert!(!f.matches(&payload(json!({"device": "android", "rating": 5}))));
    }

    #[test]
    fn range_requires_a_timestamp() {
        let f = FilterSpec {
            date_range: Some(TimestampRange { gte: Some(10), lte: None }),
            ..Default::default()
        };
        assert!(f.matches(&payload(json!({"date_ts": 10}))));
        assert!(!f.matches(&payload(json!({"date_ts": 9}))));
        assert!(!f.matches(&payload(json!({"date_ts": null}))));
    }

    #[test]
    fn refresh_outcome_is_tagged_by_status() {
        let v = serde_json::to_value(LiveRefreshOutcome::FallbackToSample {
            reason: "boom".into(),
            ingest_result: IngestSummary::ok(2, 2),
        })
        .unwrap();
        assert_eq!(v["status"], "fallback_to_sample");
        assert_eq!(v["ingest_result"]["inserted_count"], 2);
    }

    #[test]
    fn applied_filters_skip_unset_keys() {
        let v = serde_json::to_value(AppliedFilters {
            qdrant_filter: AppliedFilterSet {
                device: Some("iOS".into()),
                ..Default::default()
            },
        })
        .unwrap();
        assert_eq!(v, json!({"qdrant_filter": {"device": "iOS"}}));
    }
}
