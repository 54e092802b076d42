//! Store facade without async-trait or dynamic trait objects.
//!
//! `StoreClient` wraps the concrete SerpAPI-backed clients and exposes the
//! uniform page-fetching interface used by [`crate::pagination`].

pub mod apple;
pub mod google_play;

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::SerpApiConfig;
use crate::errors::{ProviderError, ProviderResult};
use crate::pagination::ReviewSource;
use crate::types::{PageCursor, ReviewPage, StoreKind};

/// Concrete store client with enum dispatch.
#[derive(Debug, Clone)]
pub enum StoreClient {
    GooglePlay(google_play::GooglePlayClient),
    Apple(apple::AppleClient),
}

impl StoreClient {
    /// Builds both store clients over one shared HTTP client.
    pub fn pair_from_config(cfg: &SerpApiConfig) -> ProviderResult<(Self, Self)> {
        debug!(base = %cfg.base_url, "initializing store clients");
        let http = Client::builder()
            .user_agent("review-providers/0.1")
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;

        let play = StoreClient::GooglePlay(google_play::GooglePlayClient::new(
            http.clone(),
            cfg.base_url.clone(),
            cfg.api_key.clone(),
            cfg.google_play_app_id.clone(),
        ));
        let apple = StoreClient::Apple(apple::AppleClient::new(
            http,
            cfg.base_url.clone(),
            cfg.api_key.clone(),
            cfg.apple_product_id.clone(),
            cfg.apple_country.clone(),
        ));
        Ok((play, apple))
    }
}

impl ReviewSource for StoreClient {
    fn store(&self) -> StoreKind {
        match self {
            StoreClient::GooglePlay(_) => StoreKind::GooglePlay,
            StoreClient::Apple(_) => StoreKind::Apple,
        }
    }

    fn first_cursor(&self) -> Option<PageCursor> {
        match self {
            StoreClient::GooglePlay(_) => None,
            StoreClient::Apple(_) => Some(PageCursor::Page(1)),
        }
    }

    async fn fetch_page(&self, cursor: Option<&PageCursor>) -> ProviderResult<ReviewPage> {
        match self {
            StoreClient::GooglePlay(c) => c.fetch_page(cursor).await,
            StoreClient::Apple(c) => c.fetch_page(cursor).await,
        }
    }
}

/// GET the SerpAPI endpoint and return the decoded body.
///
/// SerpAPI may report failures with an `"error"` field on any status, so the
/// body is inspected before the status code.
pub(crate) async fn get_serpapi_json(
    http: &Client,
    base_url: &str,
    params: &[(&str, String)],
) -> ProviderResult<Value> {
    let resp = http.get(base_url).query(params).send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    let json: Option<Value> = serde_json::from_str(&body).ok();
    if let Some(msg) = json.as_ref().and_then(upstream_error) {
        return Err(ProviderError::Upstream(msg));
    }
    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16()));
    }
    json.ok_or_else(|| ProviderError::InvalidResponse("body is not JSON".into()))
}

/// Extracts the provider-reported error message, if any.
pub(crate) fn upstream_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `reviews` array of a SerpAPI response; a missing key is an empty page.
pub(crate) fn reviews_array(body: &Value) -> ProviderResult<Vec<Value>> {
    match body.get("reviews") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(_) => Err(ProviderError::InvalidResponse(
            "`reviews` is not an array".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_is_reported() {
        assert_eq!(
            upstream_error(&json!({"error": "Invalid API key."})).as_deref(),
            Some("Invalid API key.")
        );
        assert!(upstream_error(&json!({"reviews": []})).is_none());
        assert!(upstream_error(&json!({"error": null})).is_none());
    }

    #[test]
    fn reviews_must_be_an_array() {
        assert!(reviews_array(&json!({})).unwrap().is_empty());
        assert!(matches!(
            reviews_array(&json!({"reviews": {"a": 1}})),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn clients_dispatch_store_kind() {
        let (play, apple) = StoreClient::pair_from_config(&SerpApiConfig::with_key("k")).unwrap();
        assert_eq!(play.store(), StoreKind::GooglePlay);
        assert_eq!(apple.store(), StoreKind::Apple);
        assert_eq!(apple.first_cursor(), Some(PageCursor::Page(1)));
        assert!(play.first_cursor().is_none());
    }
}
