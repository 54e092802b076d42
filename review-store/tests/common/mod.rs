#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use review_providers::{PageCursor, ProviderResult, ReviewPage, ReviewSource, StoreKind};
use review_store::{
    DIMENSION_PROBE, EmbedFuture, EmbeddingsProvider, InMemoryIndex, ReviewRag, StoreConfig,
};
use serde_json::Value;

pub const DIM: usize = 64;

/// Bag-of-words hashing embedder: deterministic, no network.
#[derive(Default)]
pub struct HashingEmbedder {
    pub probes: AtomicUsize,
}

impl HashingEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIM];
        v[0] = 0.1;
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut h = DefaultHasher::new();
            word.hash(&mut h);
            let slot = 1 + (h.finish() as usize) % (DIM - 1);
            v[slot] += 1.0;
        }
        v
    }
}

impl EmbeddingsProvider for HashingEmbedder {
    fn embed_one<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>> {
        if text == DIMENSION_PROBE {
            self.probes.fetch_add(1, Ordering::SeqCst);
        }
        let v = Self::vector(text);
        async move { Ok(v) }.boxed()
    }

    fn embed_many<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        let out: Vec<Vec<f32>> = texts.iter().map(|t| Self::vector(t)).collect();
        async move { Ok(out) }.boxed()
    }
}

pub struct Harness {
    pub rag: ReviewRag,
    pub embedder: Arc<HashingEmbedder>,
}

pub fn harness() -> Harness {
    harness_with_sample(Path::new("does/not/exist.json"))
}

pub fn harness_with_sample(sample: &Path) -> Harness {
    let mut cfg = StoreConfig::default();
    cfg.qdrant.collection = "reviews_test".into();
    cfg.sample_path = sample.to_path_buf();
    let embedder = Arc::new(HashingEmbedder::default());
    let rag = ReviewRag::new(cfg, Arc::new(InMemoryIndex::new()), embedder.clone());
    Harness { rag, embedder }
}

/// Store source that replays scripted pages.
pub struct ScriptedStore {
    kind: StoreKind,
    pages: Mutex<Vec<ProviderResult<ReviewPage>>>,
}

impl ScriptedStore {
    pub fn new(kind: StoreKind, mut pages: Vec<ProviderResult<ReviewPage>>) -> Self {
        pages.reverse();
        Self {
            kind,
            pages: Mutex::new(pages),
        }
    }

    pub fn empty(kind: StoreKind) -> Self {
        Self::new(kind, Vec::new())
    }
}

impl ReviewSource for ScriptedStore {
    fn store(&self) -> StoreKind {
        self.kind
    }

    fn first_cursor(&self) -> Option<PageCursor> {
        None
    }

    async fn fetch_page(&self, _cursor: Option<&PageCursor>) -> ProviderResult<ReviewPage> {
        self.pages
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(ReviewPage::default()))
    }
}

pub fn last_page(reviews: Vec<Value>) -> ProviderResult<ReviewPage> {
    Ok(ReviewPage {
        reviews,
        next: None,
    })
}
