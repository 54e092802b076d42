//! Vector index capability.
//!
//! The adapter talks to the index only through [`VectorIndex`]; collections
//! always use cosine distance.

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::errors::ReviewError;
use crate::record::FilterSpec;

pub mod memory;
pub mod qdrant;

pub use memory::InMemoryIndex;
pub use qdrant::QdrantIndex;

pub type IndexFuture<'a, T> = BoxFuture<'a, Result<T, ReviewError>>;

/// Point as written to the index.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Map<String, Value>,
}

/// Search hit with its similarity score (higher is closer).
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: u64,
    pub score: f32,
    pub payload: Map<String, Value>,
}

/// Point read back without its vector.
#[derive(Debug, Clone)]
pub struct StoredPoint {
    pub id: u64,
    pub payload: Map<String, Value>,
}

pub trait VectorIndex: Send + Sync {
    fn collection_exists<'a>(&'a self, name: &'a str) -> IndexFuture<'a, bool>;

    /// Creates a cosine-distance collection of `dim`-sized vectors.
    fn create_collection<'a>(&'a self, name: &'a str, dim: usize) -> IndexFuture<'a, ()>;

    fn delete_collection<'a>(&'a self, name: &'a str) -> IndexFuture<'a, ()>;

    /// Inserts or overwrites points by id. Returns the number written.
    fn upsert<'a>(&'a self, name: &'a str, points: Vec<VectorPoint>) -> IndexFuture<'a, usize>;

    /// Nearest neighbours in descending score, restricted by `filter`.
    fn search<'a>(
        &'a self,
        name: &'a str,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<&'a FilterSpec>,
    ) -> IndexFuture<'a, Vec<ScoredPoint>>;

    /// First `limit` points in id order.
    fn scroll<'a>(&'a self, name: &'a str, limit: usize) -> IndexFuture<'a, Vec<StoredPoint>>;

    fn count<'a>(&'a self, name: &'a str) -> IndexFuture<'a, u64>;
}
