//! Query engine: filter hints → index filter → over-fetching similarity search
//! → exact date post-filter → bounded evidence.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::RetrievalConfig;
use crate::dates::{END_OF_DAY_SECS, parse_date};
use crate::errors::ReviewResult;
use crate::instructions::NEXT_ACTION;
use crate::record::{
    AppliedFilterSet, AppliedFilters, Evidence, EvidenceMetadata, RetrievalResult,
};
use crate::vector_store::VectorStoreAdapter;

const APPLE_MODEL_MARKERS: [&str; 5] = ["iphone", "ipad", "ipod", "apple", "ios"];

/// Natural-language question plus optional structured filter hints.
///
/// Empty strings count as "not supplied".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub ratings: Vec<i64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Unsupported as a filter; mapped onto a device proxy.
    #[serde(default)]
    pub mobile_model: Option<String>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }
}

pub struct QueryEngine {
    store: Arc<VectorStoreAdapter>,
    cfg: RetrievalConfig,
}

impl QueryEngine {
    pub fn new(store: Arc<VectorStoreAdapter>, cfg: RetrievalConfig) -> Self {
        Self { store, cfg }
    }

    /// Runs one filtered retrieval.
    ///
    /// # Errors
    /// Embedding and index failures propagate unchanged.
    pub async fn query(&self, req: &QueryRequest) -> ReviewResult<RetrievalResult> {
        let mut notes: Vec<String> = Vec::new();

        let start_raw = hint(&req.start_date);
        let end_raw = hint(&req.end_date);
        let start_dt = parse_hint("start_date", start_raw, &mut notes);
        let end_dt = parse_hint("end_date", end_raw, &mut notes);
        let start_ts = start_dt.map(|d| d.timestamp());
        let end_inclusive = end_dt.map(end_of_day);
        let end_ts = end_inclusive.map(|d| d.timestamp());

        let device_hint = lowered(&req.device);
        let country = lowered(&req.country);
        let version = lowered(&req.version);
        let mut ratings: Vec<i64> = Vec::new();
        for r in req.ratings.iter().copied().filter(|r| (1..=5).contains(r)) {
            if !ratings.contains(&r) {
                ratings.push(r);
            }
        }

        let device = match hint(&req.mobile_model) {
            Some(model) => {
                let proxy = device_proxy(&device_hint, model);
                notes.push(format!(
                    "The mobile_model filter is not supported in our current system and was ignored. \
                     We used the device filter instead: {}.",
                    canonical_device(&proxy)
                ));
                proxy
            }
            None => device_hint,
        };

        let applied = AppliedFilterSet {
            start_date: start_dt.and(start_raw).map(str::to_string),
            end_date: end_dt.and(end_raw).map(str::to_string),
            device: (!device.is_empty()).then(|| canonical_device(&device)),
            rating: (!ratings.is_empty()).then(|| ratings.clone()),
            country: (!country.is_empty()).then(|| country.clone()),
            version: (!version.is_empty()).then(|| version.clone()),
        };

        let filter = self
            .store
            .build_filter(&device, &ratings, &country, &version, start_ts, end_ts);
        debug!(filter = ?filter, "query filter built");

        let hits = self
            .store
            .similarity_query(&req.question, self.cfg.query_limit, filter.as_ref())
            .await?;

        let date_bounded = start_dt.is_some() || end_inclusive.is_some();
        let mut evidence: Vec<Evidence> = Vec::new();
        for ((id, text), meta) in hits.ids.iter().zip(&hits.documents).zip(&hits.metadatas) {
            if date_bounded && !date_in_range(meta, start_dt, end_inclusive) {
                continue;
            }
            evidence.push(to_evidence(id, text, meta));
            if evidence.len() >= self.cfg.evidence_cap {
                break;
            }
        }

        info!(
            hits = hits.len(),
            evidence = evidence.len(),
            notes = notes.len(),
            "review query answered"
        );

        Ok(RetrievalResult {
            question: req.question.clone(),
            retrieved_documents: evidence,
            applied_filters: AppliedFilters {
                qdrant_filter: applied,
            },
            notes,
            next_action: NEXT_ACTION.to_string(),
        })
    }
}

fn hint(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn lowered(v: &Option<String>) -> String {
    hint(v).map(str::to_lowercase).unwrap_or_default()
}

fn parse_hint(name: &str, raw: Option<&str>, notes: &mut Vec<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        notes.push(format!(
            "The {name} value '{raw}' could not be parsed as a date and was ignored."
        ));
    }
    parsed
}

/// Last second of the day starting at `day`, saturating at the latest
/// representable instant.
fn end_of_day(day: DateTime<Utc>) -> DateTime<Utc> {
    day.checked_add_signed(Duration::seconds(END_OF_DAY_SECS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Device used in place of an unsupported `mobile_model` hint (lower-case).
fn device_proxy(device_hint: &str, model: &str) -> String {
    let model = model.to_lowercase();
    if device_hint == "ios" || APPLE_MODEL_MARKERS.iter().any(|m| model.contains(m)) {
        "ios".to_string()
    } else if !device_hint.is_empty() {
        device_hint.to_string()
    } else {
        "android".to_string()
    }
}

fn canonical_device(device: &str) -> String {
    match device {
        "ios" => "iOS".to_string(),
        "android" => "Android".to_string(),
        other => other.to_string(),
    }
}

/// Second-pass range check on the stored `date`; unparseable dates fail.
fn date_in_range(
    meta: &Map<String, Value>,
    start: Option<DateTime<Utc>>,
    end_inclusive: Option<DateTime<Utc>>,
) -> bool {
    let Some(dt) = meta.get("date").and_then(Value::as_str).and_then(parse_date) else {
        return false;
    };
    start.is_none_or(|s| dt >= s) && end_inclusive.is_none_or(|e| dt <= e)
}

fn to_evidence(id: &str, text: &str, meta: &Map<String, Value>) -> Evidence {
    let text_field = |k: &str| meta.get(k).and_then(Value::as_str).map(str::to_string);
    Evidence {
        text: text.to_string(),
        metadata: EvidenceMetadata {
            id: text_field("id")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| id.to_string()),
            rating: meta.get("rating").and_then(Value::as_i64),
            date: text_field("date"),
            version: text_field("version"),
            device: text_field("device").unwrap_or_default(),
            country: text_field("country").unwrap_or_default(),
        },
    }
}
