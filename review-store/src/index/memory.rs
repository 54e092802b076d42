//! In-memory [`VectorIndex`] for tests and offline runs.
//!
//! Collections live in a `BTreeMap` behind `std::sync::RwLock`. Search is
//! brute-force cosine similarity over every point that passes the filter.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;

use super::{IndexFuture, ScoredPoint, StoredPoint, VectorIndex, VectorPoint};
use crate::errors::{ReviewError, ReviewResult};
use crate::record::FilterSpec;

struct Collection {
    dim: usize,
    points: BTreeMap<u64, VectorPoint>,
}

#[derive(Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ReviewResult<RwLockReadGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .read()
            .map_err(|_| ReviewError::Index("in-memory index lock poisoned".into()))
    }

    fn write(&self) -> ReviewResult<RwLockWriteGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .write()
            .map_err(|_| ReviewError::Index("in-memory index lock poisoned".into()))
    }

    fn upsert_now(&self, name: &str, points: Vec<VectorPoint>) -> ReviewResult<usize> {
        let mut guard = self.write()?;
        let coll = guard.get_mut(name).ok_or_else(|| missing(name))?;
        if let Some(bad) = points.iter().find(|p| p.vector.len() != coll.dim) {
            return Err(ReviewError::Index(format!(
                "vector size mismatch: got {}, want {}",
                bad.vector.len(),
                coll.dim
            )));
        }
        let n = points.len();
        for p in points {
            coll.points.insert(p.id, p);
        }
        Ok(n)
    }

    fn search_now(
        &self,
        name: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&FilterSpec>,
    ) -> ReviewResult<Vec<ScoredPoint>> {
        let guard = self.read()?;
        let coll = guard.get(name).ok_or_else(|| missing(name))?;
        let mut hits: Vec<ScoredPoint> = coll
            .points
            .values()
            .filter(|p| filter.is_none_or(|f| f.matches(&p.payload)))
            .map(|p| ScoredPoint {
                id: p.id,
                score: cosine_sim(vector, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }
}

fn missing(name: &str) -> ReviewError {
    ReviewError::Index(format!("collection '{name}' not found"))
}

fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

impl VectorIndex for InMemoryIndex {
    fn collection_exists<'a>(&'a self, name: &'a str) -> IndexFuture<'a, bool> {
        let res = self.read().map(|g| g.contains_key(name));
        async move { res }.boxed()
    }

    fn create_collection<'a>(&'a self, name: &'a str, dim: usize) -> IndexFuture<'a, ()> {
        let res = self.write().and_then(|mut g| {
            if g.contains_key(name) {
                return Err(ReviewError::Index(format!("collection '{name}' already exists")));
            }
            g.insert(
                name.to_string(),
                Collection {
                    dim,
                    points: BTreeMap::new(),
                },
            );
            Ok(())
        });
        async move { res }.boxed()
    }

    fn delete_collection<'a>(&'a self, name: &'a str) -> IndexFuture<'a, ()> {
        let res = self.write().map(|mut g| {
            g.remove(name);
        });
        async move { res }.boxed()
    }

    fn upsert<'a>(&'a self, name: &'a str, points: Vec<VectorPoint>) -> IndexFuture<'a, usize> {
        let res = self.upsert_now(name, points);
        async move { res }.boxed()
    }

    fn search<'a>(
        &'a self,
        name: &'a str,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<&'a FilterSpec>,
    ) -> IndexFuture<'a, Vec<ScoredPoint>> {
        let res = self.search_now(name, &vector, limit, filter);
        async move { res }.boxed()
    }

    fn scroll<'a>(&'a self, name: &'a str, limit: usize) -> IndexFuture<'a, Vec<StoredPoint>> {
        let res: ReviewResult<Vec<StoredPoint>> = self.read().and_then(|g| {
            let coll = g.get(name).ok_or_else(|| missing(name))?;
            Ok(coll
                .points
                .values()
                .take(limit)
                .map(|p| StoredPoint {
                    id: p.id,
                    payload: p.payload.clone(),
                })
                .collect())
        });
        async move { res }.boxed()
    }

    fn count<'a>(&'a self, name: &'a str) -> IndexFuture<'a, u64> {
        let res = self.read().and_then(|g| {
            g.get(name)
                .map(|c| c.points.len() as u64)
                .ok_or_else(|| missing(name))
        });
        async move { res }.boxed()
    }
}
