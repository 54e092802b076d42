//! review-providers: raw store reviews from Google Play and the Apple App
//! Store, fetched through SerpAPI.
//!
//! High-level flow:
//!   1) build a [`SerpApiConfig`] (usually [`SerpApiConfig::from_env`]);
//!   2) create both [`StoreClient`]s with [`StoreClient::pair_from_config`];
//!   3) walk each store with [`collect_reviews`], which tags every raw review
//!      with its device (`Android` / `iOS`) and source country.
//!
//! Reviews are returned as raw JSON objects; normalization happens downstream.

pub mod config;
pub mod errors;
pub mod pagination;
pub mod stores;
pub mod types;

pub use config::SerpApiConfig;
pub use errors::{ProviderError, ProviderResult};
pub use pagination::{Harvest, ReviewSource, collect_reviews};
pub use stores::StoreClient;
pub use types::{PageCursor, ReviewPage, StoreKind};
