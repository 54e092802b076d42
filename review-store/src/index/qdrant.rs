//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! All Qdrant calls live here, behind [`VectorIndex`], so the rest of the
//! crate never touches the builder API.

use std::collections::HashMap;

use futures::FutureExt;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointId, PointStruct,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QValue,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{IndexFuture, ScoredPoint, StoredPoint, VectorIndex, VectorPoint};
use crate::config::QdrantConfig;
use crate::errors::{ReviewError, ReviewResult};
use crate::filters::to_qdrant_filter;
use crate::record::FilterSpec;

/// Qdrant-backed [`VectorIndex`].
pub struct QdrantIndex {
    client: Qdrant,
}

impl QdrantIndex {
    /// Builds the client; supports optional API key authentication.
    pub fn new(cfg: &QdrantConfig) -> ReviewResult<Self> {
        if cfg.url.trim().is_empty() {
            return Err(ReviewError::Config("qdrant url is empty".into()));
        }
        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build()?;
        info!(url = %cfg.url, "qdrant client ready");
        Ok(Self { client })
    }

    async fn upsert_points(&self, name: &str, points: Vec<VectorPoint>) -> ReviewResult<usize> {
        if points.is_empty() {
            return Ok(0);
        }
        let n = points.len();
        let structs: Vec<PointStruct> = points
            .into_iter()
            .map(|p| PointStruct::new(p.id, p.vector, Payload::from(p.payload)))
            .collect();

        let res = self
            .client
            .upsert_points(UpsertPointsBuilder::new(name, structs).wait(true))
            .await?;
        debug!(collection = name, points = n, result = ?res.result, "upsert done");
        Ok(n)
    }

    async fn search_points(
        &self,
        name: &str,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<&FilterSpec>,
    ) -> ReviewResult<Vec<ScoredPoint>> {
        let mut builder = SearchPointsBuilder::new(name, vector, limit as u64).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(to_qdrant_filter(f));
        }
        let res = self.client.search_points(builder).await?;
        Ok(res
            .result
            .into_iter()
            .map(|p| ScoredPoint {
                id: numeric_id(p.id.as_ref()),
                score: p.score,
                payload: qpayload_to_json(p.payload),
            })
            .collect())
    }

    async fn scroll_points(&self, name: &str, limit: usize) -> ReviewResult<Vec<StoredPoint>> {
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        let res = self
            .client
            .scroll(
                ScrollPointsBuilder::new(name)
                    .limit(limit)
                    .with_payload(true)
                    .with_vectors(false),
            )
            .await?;
        Ok(res
            .result
            .into_iter()
            .map(|p| StoredPoint {
                id: numeric_id(p.id.as_ref()),
                payload: qpayload_to_json(p.payload),
            })
            .collect())
    }
}

impl VectorIndex for QdrantIndex {
    fn collection_exists<'a>(&'a self, name: &'a str) -> IndexFuture<'a, bool> {
        async move { Ok(self.client.collection_exists(name).await?) }.boxed()
    }

    fn create_collection<'a>(&'a self, name: &'a str, dim: usize) -> IndexFuture<'a, ()> {
        async move {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(name)
                        .vectors_config(VectorParamsBuilder::new(dim as u64, Distance::Cosine)),
                )
                .await?;
            info!(collection = name, dim, "collection created");
            Ok(())
        }
        .boxed()
    }

    fn delete_collection<'a>(&'a self, name: &'a str) -> IndexFuture<'a, ()> {
        async move {
            self.client.delete_collection(name).await?;
            Ok(())
        }
        .boxed()
    }

    fn upsert<'a>(&'a self, name: &'a str, points: Vec<VectorPoint>) -> IndexFuture<'a, usize> {
        self.upsert_points(name, points).boxed()
    }

    fn search<'a>(
        &'a self,
        name: &'a str,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<&'a FilterSpec>,
    ) -> IndexFuture<'a, Vec<ScoredPoint>> {
        self.search_points(name, vector, limit, filter).boxed()
    }

    fn scroll<'a>(&'a self, name: &'a str, limit: usize) -> IndexFuture<'a, Vec<StoredPoint>> {
        self.scroll_points(name, limit).boxed()
    }

    fn count<'a>(&'a self, name: &'a str) -> IndexFuture<'a, u64> {
        async move {
            let res = self
                .client
                .count(CountPointsBuilder::new(name).exact(true))
                .await?;
            Ok(res.result.map(|r| r.count).unwrap_or(0))
        }
        .boxed()
    }
}

/// Numeric point id; UUID ids (never written by this crate) map to 0.
fn numeric_id(id: Option<&PointId>) -> u64 {
    match id.and_then(|p| p.point_id_options.as_ref()) {
        Some(PointIdOptions::Num(n)) => *n,
        _ => 0,
    }
}

/// Converts a Qdrant payload into a JSON object, recursing into lists and structs.
fn qpayload_to_json(p: HashMap<String, QValue>) -> Map<String, Value> {
    p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect()
}

fn qvalue_to_json(v: QValue) -> Value {
    match v.kind {
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qvalue_to_json).collect())
        }
        Some(Kind::StructValue(st)) => Value::Object(qpayload_to_json(st.fields)),
        Some(Kind::NullValue(_)) | None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_roundtrips_nested_values() {
        let json = serde_json::json!({
            "id": "gp-1",
            "rating": 5,
            "date_ts": null,
            "tags": ["a", "b"],
            "author": {"name": "x"}
        });
        let Value::Object(map) = json.clone() else {
            unreachable!()
        };
        let point = PointStruct::new(1u64, vec![0.0], Payload::from(map));
        assert_eq!(Value::Object(qpayload_to_json(point.payload)), json);
    }

    #[test]
    fn numeric_ids_are_extracted() {
        let id = PointId::from(42u64);
        assert_eq!(numeric_id(Some(&id)), 42);
        assert_eq!(numeric_id(None), 0);
    }
}
