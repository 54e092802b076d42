//! Raw review → [`NormalizedReview`].
//!
//! Every function here is total: missing or malformed fields fall back to
//! defaults instead of failing.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{NormalizeConfig, VersionCutovers};
use crate::dates::{format_day, parse_date};
use crate::errors::{ReviewError, ReviewResult};
use crate::ids::content_review_id;
use crate::record::{NormalizedReview, ProjectedBatch, ReviewMetadata};

pub const DEFAULT_DEVICE: &str = "Android";
pub const DEFAULT_COUNTRY: &str = "India";
const KNOWN_VERSIONS: [&str; 3] = ["v1", "v2", "v3"];

/// Pulls the list of raw reviews out of an accepted payload shape:
/// a bare list, `{"reviews": [...]}`, or `{"google_play": [...], "apple": [...]}`
/// (either key optional, Google Play first).
pub fn extract_list(payload: Value) -> ReviewResult<Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("reviews") {
                return Ok(items);
            }
            let mut out = store_list(&mut map, "google_play")?;
            out.extend(store_list(&mut map, "apple")?);
            Ok(out)
        }
        _ => Err(ReviewError::Validation(
            "payload must be a review list or an object containing reviews".into(),
        )),
    }
}

fn store_list(map: &mut Map<String, Value>, key: &str) -> ReviewResult<Vec<Value>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ReviewError::Validation(format!("`{key}` must be a list"))),
    }
}

/// Normalizes one raw review. Non-object input is treated as an empty object.
pub fn normalize(raw: &Value, cfg: &NormalizeConfig) -> NormalizedReview {
    let empty = Map::new();
    let item = raw.as_object().unwrap_or(&empty);

    let dt = first_text(item, &["iso_date", "date", "review_date"]).and_then(parse_date);

    let review_text = clamp_text(
        first_text(item, &["snippet", "text"]).unwrap_or_default(),
        cfg.max_document_chars,
    );

    let version = explicit_version(item.get("version"))
        .unwrap_or_else(|| classify_version(dt.map(|d| d.timestamp()), &cfg.cutovers).to_string());

    let title = first_text(item, &["title"])
        .or_else(|| {
            item.get("author")
                .and_then(|a| a.get("name"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or("Unknown")
        .to_string();

    NormalizedReview {
        id: source_id(item).unwrap_or_else(|| stable_review_id(item)),
        title,
        rating: parse_rating(item.get("rating")),
        review_text,
        date: dt.as_ref().map(format_day).unwrap_or_default(),
        date_ts: dt.map(|d| d.timestamp()),
        version,
        device: first_text(item, &["device"]).unwrap_or(DEFAULT_DEVICE).to_string(),
        country: first_text(item, &["country"]).unwrap_or(DEFAULT_COUNTRY).to_string(),
    }
}

/// Normalizes every raw review in order.
pub fn normalize_all(raw: &[Value], cfg: &NormalizeConfig) -> Vec<NormalizedReview> {
    let out: Vec<NormalizedReview> = raw.iter().map(|r| normalize(r, cfg)).collect();
    debug!(count = out.len(), "reviews normalized");
    out
}

/// Splits normalized reviews into parallel ids, documents and metadata.
/// `device` and `country` are lower-cased here.
pub fn project(reviews: &[NormalizedReview]) -> ProjectedBatch {
    let mut batch = ProjectedBatch::default();
    for r in reviews {
        batch.ids.push(r.id.clone());
        batch.documents.push(r.review_text.clone());
        batch.metadatas.push(ReviewMetadata {
            id: r.id.clone(),
            title: r.title.clone(),
            rating: r.rating,
            date: r.date.clone(),
            date_ts: r.date_ts,
            version: r.version.clone(),
            device: r.device.to_lowercase(),
            country: r.country.to_lowercase(),
        });
    }
    batch
}

/// Deterministic id for reviews without a source id.
pub fn stable_review_id(item: &Map<String, Value>) -> String {
    let title = item.get("title").and_then(Value::as_str).unwrap_or_default();
    let text = first_text(item, &["snippet", "text"]).unwrap_or_default();
    let date = first_text(item, &["date", "review_date"]).unwrap_or_default();
    content_review_id(title, text, date)
}

/// `v3` from `v3_start`, `v2` from `v2_start`, `v1` otherwise (and when undated).
pub fn classify_version(ts: Option<i64>, cutovers: &VersionCutovers) -> &'static str {
    match ts {
        Some(t) if t >= cutovers.v3_start.timestamp() => "v3",
        Some(t) if t >= cutovers.v2_start.timestamp() => "v2",
        _ => "v1",
    }
}

/// Rating truncated toward zero and clamped into `1..=5`.
pub fn parse_rating(raw: Option<&Value>) -> i64 {
    let value = match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    (value.trunc() as i64).clamp(1, 5)
}

/// Trims, cuts to `max_chars` characters, trims again.
pub fn clamp_text(raw: &str, max_chars: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    cut.trim().to_string()
}

fn first_text<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn source_id(item: &Map<String, Value>) -> Option<String> {
    match item.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn explicit_version(raw: Option<&Value>) -> Option<String> {
    let v = raw?.as_str()?.trim().to_lowercase();
    KNOWN_VERSIONS.contains(&v.as_str()).then_some(v)
}
