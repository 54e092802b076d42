//! Google Play reviews via the SerpAPI `google_play_product` engine.
//!
//! Pages are chained by `serpapi_pagination.next_page_token`.

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{get_serpapi_json, reviews_array};
use crate::errors::ProviderResult;
use crate::types::{PageCursor, ReviewPage};

/// Largest page size the engine accepts.
const PAGE_SIZE: u32 = 199;

#[derive(Debug, Clone)]
pub struct GooglePlayClient {
    http: Client,
    base_url: String,
    api_key: String,
    app_id: String,
}

impl GooglePlayClient {
    pub fn new(http: Client, base_url: String, api_key: String, app_id: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            app_id,
        }
    }

    /// Fetches one page, most relevant first (`sort_by=1`). `cursor` must be a
    /// token or `None`.
    pub async fn fetch_page(&self, cursor: Option<&PageCursor>) -> ProviderResult<ReviewPage> {
        let params = self.query_params(cursor);
        debug!(app = %self.app_id, cursor = ?cursor, "google play page");
        let body = get_serpapi_json(&self.http, &self.base_url, &params).await?;
        parse_page(&body)
    }

    fn query_params(&self, cursor: Option<&PageCursor>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("engine", "google_play_product".to_string()),
            ("product_id", self.app_id.clone()),
            ("store", "apps".to_string()),
            ("all_reviews", "true".to_string()),
            ("num", PAGE_SIZE.to_string()),
            ("sort_by", "1".to_string()),
            ("api_key", self.api_key.clone()),
        ];
        if let Some(PageCursor::Token(token)) = cursor {
            params.push(("next_page_token", token.clone()));
        }
        params
    }
}

/// Splits a response into reviews and the next-page token.
pub(crate) fn parse_page(body: &Value) -> ProviderResult<ReviewPage> {
    let reviews = reviews_array(body)?;
    let next = body
        .get("serpapi_pagination")
        .and_then(|p| p.get("next_page_token"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(|t| PageCursor::Token(t.to_string()));
    Ok(ReviewPage { reviews, next })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_is_read_from_pagination_block() {
        let body = json!({
            "reviews": [{"title": "a"}, {"title": "b"}],
            "serpapi_pagination": {"next_page_token": "tok-2"}
        });
        let page = parse_page(&body).unwrap();
        assert_eq!(page.reviews.len(), 2);
        assert_eq!(page.next, Some(PageCursor::Token("tok-2".into())));
    }

    #[test]
    fn last_page_has_no_cursor() {
        let page = parse_page(&json!({"reviews": []})).unwrap();
        assert!(page.reviews.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn token_cursor_is_forwarded() {
        let cli = GooglePlayClient::new(Client::new(), "http://x".into(), "k".into(), "app".into());
        let params = cli.query_params(Some(&PageCursor::Token("t".into())));
        assert!(params.contains(&("next_page_token", "t".to_string())));
        assert!(params.contains(&("product_id", "app".to_string())));
    }

    #[test]
    fn pages_are_requested_most_relevant_first() {
        let cli = GooglePlayClient::new(Client::new(), "http://x".into(), "k".into(), "app".into());
        let params = cli.query_params(None);
        assert!(params.contains(&("sort_by", "1".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "next_page_token"));
    }
}
